//! Inputs and outputs of one `generate` call.

use serde::{Deserialize, Serialize};

use crate::content::{ContentUnit, HistoricEntry};
use crate::document::DocumentRef;

/// Optional inputs of `generate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    /// Attach the call to this telemetry trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// Free text placed ahead of the static system prompt blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(default)]
    pub documents: Vec<DocumentRef>,

    /// Administrator-side discussion log.
    #[serde(default)]
    pub human_chat_history: Vec<HistoricEntry>,
}

/// Metadata returned with the answer.
///
/// `contents` is exactly the content sequence sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub question: String,
    pub vector_name: String,
    pub contents: Vec<ContentUnit>,
}

/// Final payload of `generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResult {
    pub answer: String,
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_payload_shape() {
        let result = GenerateResult {
            answer: "Hello!".to_string(),
            metadata: ResponseMetadata {
                question: "hi".to_string(),
                vector_name: "emissary".to_string(),
                contents: vec![ContentUnit::user_text("hi")],
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "answer": "Hello!",
                "metadata": {
                    "question": "hi",
                    "vector_name": "emissary",
                    "contents": [{"role": "user", "parts": [{"text": "hi"}]}]
                }
            })
        );
    }

    #[test]
    fn test_options_accept_frontend_field_names() {
        let json = r#"{
            "traceId": "t-1",
            "instructions": "be brief",
            "humanChatHistory": [{"name": "Admin", "content": "hello"}]
        }"#;
        let options: GenerateOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.trace_id.as_deref(), Some("t-1"));
        assert_eq!(options.human_chat_history.len(), 1);
        assert!(options.documents.is_empty());
    }
}
