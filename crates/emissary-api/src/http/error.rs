//! Application error type mapping to HTTP status codes and the error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use emissary_types::error::{ConfigError, DocumentError, GenerateError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A failed `generate` call (configuration, model or document).
    Generate(GenerateError),
    /// Invalid request input.
    Validation(String),
}

impl From<GenerateError> for AppError {
    fn from(e: GenerateError) -> Self {
        AppError::Generate(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Generate(e.into())
    }
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Generate(GenerateError::Config(ConfigError::InvalidVacName(_))) => {
                (StatusCode::BAD_REQUEST, "INVALID_VAC")
            }
            AppError::Generate(GenerateError::Config(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            AppError::Generate(GenerateError::Model(_)) => (StatusCode::BAD_GATEWAY, "MODEL_ERROR"),
            AppError::Generate(GenerateError::Document(DocumentError::DisallowedUrl { .. })) => {
                (StatusCode::BAD_REQUEST, "DOCUMENT_REJECTED")
            }
            AppError::Generate(GenerateError::Document(_)) => {
                (StatusCode::BAD_GATEWAY, "DOCUMENT_ERROR")
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Generate(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        } else {
            tracing::debug!(code, %message, "Request rejected");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
