//! Generative model providers.

pub mod gemini;
