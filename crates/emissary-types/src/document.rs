//! References to uploaded documents, as sent by the chat frontend.

use serde::{Deserialize, Serialize};

/// MIME type used when a document carries none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A document attached to the conversation.
///
/// Mirrors the frontend's document record. `kind` holds the browser-reported
/// file type (the JSON `type` field), `content_type` the type recorded by
/// storage at upload time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl DocumentRef {
    /// Best known MIME type: storage content type, then the browser type,
    /// then `application/octet-stream`.
    pub fn mime_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| Some(self.kind.as_str()).filter(|t| !t.is_empty()))
            .unwrap_or(DEFAULT_MIME_TYPE)
    }
}

/// Returns true for MIME types whose bytes are sent to the model as text.
pub fn is_text_mime(mime: &str) -> bool {
    let mime = mime.split(';').next().unwrap_or_default().trim();
    mime.starts_with("text/")
        || matches!(
            mime,
            "application/json"
                | "application/xml"
                | "application/x-yaml"
                | "application/yaml"
                | "application/javascript"
                | "application/x-python"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_frontend_record() {
        let json = r#"{
            "type": "application/pdf",
            "name": "paper.pdf",
            "url": "https://example.test/paper.pdf",
            "storagePath": "users/u1/shares/s1/documents/paper.pdf",
            "size": 1024,
            "uploadedAt": "2024-11-02T10:00:00Z"
        }"#;
        let doc: DocumentRef = serde_json::from_str(json).unwrap();
        assert_eq!(doc.kind, "application/pdf");
        assert_eq!(
            doc.storage_path.as_deref(),
            Some("users/u1/shares/s1/documents/paper.pdf")
        );
        assert_eq!(doc.size, Some(1024));
        assert_eq!(doc.mime_type(), "application/pdf");
    }

    #[test]
    fn test_mime_type_prefers_content_type() {
        let doc = DocumentRef {
            name: "notes".to_string(),
            url: String::new(),
            kind: "application/octet-stream".to_string(),
            storage_path: None,
            content_type: Some("text/markdown".to_string()),
            size: None,
        };
        assert_eq!(doc.mime_type(), "text/markdown");
    }

    #[test]
    fn test_mime_type_default() {
        let doc: DocumentRef = serde_json::from_str(r#"{"name":"blob"}"#).unwrap();
        assert_eq!(doc.mime_type(), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_is_text_mime() {
        assert!(is_text_mime("text/plain"));
        assert!(is_text_mime("text/csv; charset=utf-8"));
        assert!(is_text_mime("application/json"));
        assert!(!is_text_mime("application/pdf"));
        assert!(!is_text_mime("image/png"));
    }
}
