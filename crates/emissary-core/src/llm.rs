//! Generative model client contract.
//!
//! A [`ModelFactory`] instantiates a model handle per request from the model
//! name, safety settings and system instruction; the handle then runs one
//! streaming call. Implementations live in emissary-infra (`GeminiModelFactory`).

use std::pin::Pin;

use futures_util::Stream;

use emissary_types::content::ContentUnit;
use emissary_types::llm::{LlmError, ModelChunk, SafetySetting};

/// Stream of chunks from one generative call.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ModelChunk, LlmError>> + Send + 'static>>;

/// A configured model, ready to stream.
pub trait GenerativeModel: Send + Sync {
    /// Model identifier (e.g. "gemini-1.5-flash").
    fn name(&self) -> &str;

    /// Start a streaming call over `contents`.
    ///
    /// Returns a boxed stream rather than a future: connection and HTTP
    /// status errors surface as the first stream item.
    fn generate_streaming(&self, contents: Vec<ContentUnit>) -> ChunkStream;
}

/// Creates model handles.
pub trait ModelFactory: Send + Sync {
    type Model: GenerativeModel;

    fn create_model(
        &self,
        name: &str,
        safety_settings: &[SafetySetting],
        system_instruction: &str,
    ) -> Result<Self::Model, LlmError>;
}
