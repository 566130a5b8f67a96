//! Infrastructure adapters for Emissary.
//!
//! Implements the ports declared in `emissary-core`: the Gemini streaming
//! client, the storage-backed document resolver and the TOML config loader.

pub mod config;
pub mod document;
pub mod llm;
