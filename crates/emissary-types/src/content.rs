//! Conversational content sent to the generative model.
//!
//! The shapes serialize to the generative API's wire format, so the same
//! values are used for the request body and for the `contents` field of the
//! response metadata:
//!
//! ```json
//! {"role": "user", "parts": [{"text": "hello"}]}
//! {"role": "user", "parts": [{"inlineData": {"mimeType": "application/pdf", "data": "..."}}]}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Speaker of a content unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            other => Err(format!("invalid content role: '{other}'")),
        }
    }
}

/// Raw bytes carried inline, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

/// A file the model can fetch by URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub mime_type: String,
    pub file_uri: String,
}

/// One part of a content unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentPart {
    Text(String),
    InlineData(Blob),
    FileData(FileRef),
}

impl ContentPart {
    /// The text of a text part, `None` for document parts.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// One role-tagged block of conversational content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnit {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl ContentUnit {
    /// A user unit with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    /// A model unit with a single text part.
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(ContentPart::as_text).collect()
    }
}

/// One prior exchange of the bot conversation: what the human said and what
/// the model answered. Either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub human: String,
    pub ai: String,
}

impl ChatTurn {
    pub fn new(human: impl Into<String>, ai: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            ai: ai.into(),
        }
    }
}

/// One entry of the administrator-side discussion log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricEntry {
    pub name: String,
    pub content: String,
}
