use thiserror::Error;

use crate::llm::LlmError;

/// Per-chunk delivery errors. Non-fatal: the relay logs them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("chunk blocked by safety filters: {0}")]
    Blocked(String),

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token receiver closed")]
    ReceiverClosed,
}

/// Errors resolving document references into content.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document '{name}' has no url or storage path")]
    MissingLocation { name: String },

    #[error("document '{name}' not found")]
    NotFound { name: String },

    #[error("failed to fetch document '{name}': {message}")]
    Fetch { name: String, message: String },

    #[error("document '{name}' is {size} bytes, above the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("document '{name}' url {url} is outside document storage")]
    DisallowedUrl { name: String, url: String },
}

/// Errors resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid VAC name '{0}'")]
    InvalidVacName(String),

    #[error("missing API key: set {0}")]
    MissingApiKey(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Fatal errors of one `generate` call.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] LlmError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
