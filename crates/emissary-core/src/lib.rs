//! Orchestration core for Emissary.
//!
//! Builds the conversational content for a chat question, composes the
//! system instruction, relays the model's streaming output to a callback and
//! returns the final answer with its metadata.
//!
//! This crate defines the "ports" the infrastructure layer implements
//! (model factory, document resolver, tracer, configuration resolver). It
//! depends only on `emissary-types` -- never on `emissary-infra` or any
//! HTTP crate.

pub mod assembler;
pub mod config;
pub mod document;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod relay;
pub mod telemetry;
