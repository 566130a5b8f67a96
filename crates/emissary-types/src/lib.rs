//! Shared domain types for Emissary.
//!
//! Request-scoped values exchanged between the routing layer, the
//! orchestration core and the infrastructure adapters: content units sent to
//! the generative model, document references, streamed chunks, the final
//! `{answer, metadata}` payload, configuration, and the error enums.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod generate;
pub mod llm;
