//! Generative model types: streamed chunks, the full streamed response,
//! safety settings, and model errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TokenError;

/// Model used when the VAC configuration names none.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Token counts reported by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub candidates_tokens: u32,
    pub total_tokens: u32,
}

/// An incremental piece of a streaming model response.
///
/// A chunk may carry no text at all (metadata-only events). A chunk blocked by
/// the model's safety filters has a `block_reason` and its text cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ModelChunk {
    /// A chunk carrying text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// A chunk without text.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A chunk rejected by the safety filters.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            block_reason: Some(reason.into()),
            finish_reason: Some("SAFETY".to_string()),
            ..Self::default()
        }
    }

    /// The chunk text, or [`TokenError::Blocked`] when the safety filters
    /// withheld it.
    pub fn try_text(&self) -> Result<Option<&str>, TokenError> {
        if let Some(reason) = &self.block_reason {
            return Err(TokenError::Blocked(reason.clone()));
        }
        Ok(self.text.as_deref())
    }
}

/// The full response of one streaming call, handed to the completion callback.
///
/// Holds every chunk as received, including chunks that were skipped while
/// relaying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub model: String,
    pub chunks: Vec<ModelChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Set when the stream ended on an upstream error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelResponse {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Record a received chunk.
    pub fn push(&mut self, chunk: ModelChunk) {
        if chunk.finish_reason.is_some() {
            self.finish_reason.clone_from(&chunk.finish_reason);
        }
        if chunk.usage.is_some() {
            self.usage = chunk.usage;
        }
        self.chunks.push(chunk);
    }

    /// Concatenated text of every readable chunk.
    pub fn text(&self) -> String {
        self.chunks
            .iter()
            .filter_map(|c| c.try_text().ok().flatten())
            .collect()
    }
}

/// Harm categories the safety filters score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::HarmCategoryHarassment,
        HarmCategory::HarmCategoryHateSpeech,
        HarmCategory::HarmCategorySexuallyExplicit,
        HarmCategory::HarmCategoryDangerousContent,
    ];
}

/// Probability at which a response is blocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    #[default]
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

impl fmt::Display for HarmBlockThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarmBlockThreshold::BlockNone => write!(f, "BLOCK_NONE"),
            HarmBlockThreshold::BlockOnlyHigh => write!(f, "BLOCK_ONLY_HIGH"),
            HarmBlockThreshold::BlockMediumAndAbove => write!(f, "BLOCK_MEDIUM_AND_ABOVE"),
            HarmBlockThreshold::BlockLowAndAbove => write!(f, "BLOCK_LOW_AND_ABOVE"),
        }
    }
}

impl FromStr for HarmBlockThreshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BLOCK_NONE" => Ok(HarmBlockThreshold::BlockNone),
            "BLOCK_ONLY_HIGH" => Ok(HarmBlockThreshold::BlockOnlyHigh),
            "BLOCK_MEDIUM_AND_ABOVE" => Ok(HarmBlockThreshold::BlockMediumAndAbove),
            "BLOCK_LOW_AND_ABOVE" => Ok(HarmBlockThreshold::BlockLowAndAbove),
            other => Err(format!("invalid harm block threshold: '{other}'")),
        }
    }
}

/// One safety filter setting sent with the model request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    /// The same threshold for every harm category.
    pub fn all(threshold: HarmBlockThreshold) -> Vec<SafetySetting> {
        HarmCategory::ALL
            .iter()
            .map(|&category| SafetySetting {
                category,
                threshold,
            })
            .collect()
    }
}

/// Errors from the generative model client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
