//! Wire types for the Gemini `streamGenerateContent` endpoint.

use serde::{Deserialize, Serialize};

use emissary_types::content::{ContentPart, ContentUnit};
use emissary_types::llm::{ModelChunk, SafetySetting, Usage};

/// Finish reasons for which the candidate text is withheld.
const BLOCKING_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<ContentUnit>,
    pub system_instruction: SystemInstruction,
    pub safety_settings: Vec<SafetySetting>,
}

/// The system instruction, sent as a role-less content.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<ContentPart>,
}

impl SystemInstruction {
    pub fn text(text: &str) -> Self {
        Self {
            parts: vec![ContentPart::Text(text.to_string())],
        }
    }
}

/// One streamed response event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part. Only text is relayed; other part kinds are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

impl From<UsageMetadata> for Usage {
    fn from(u: UsageMetadata) -> Self {
        Usage {
            prompt_tokens: u.prompt_token_count,
            candidates_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        }
    }
}

impl GenerateContentResponse {
    /// Convert into a provider-agnostic chunk.
    ///
    /// The chunk text is the concatenation of the first candidate's text
    /// parts. A blocked prompt, or a candidate stopped by a blocking finish
    /// reason without any text, yields a blocked chunk.
    pub fn into_chunk(self) -> ModelChunk {
        let usage = self.usage_metadata.map(Usage::from);

        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return ModelChunk {
                usage,
                ..ModelChunk::blocked(reason)
            };
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return ModelChunk {
                usage,
                ..ModelChunk::empty()
            };
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        let text = if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if text.is_none() && BLOCKING_FINISH_REASONS.contains(&reason) {
                return ModelChunk {
                    usage,
                    ..ModelChunk::blocked(reason)
                };
            }
        }

        ModelChunk {
            text,
            finish_reason: candidate.finish_reason,
            block_reason: None,
            usage,
        }
    }
}
