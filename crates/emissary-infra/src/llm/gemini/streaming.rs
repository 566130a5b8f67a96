//! SSE stream handling for `streamGenerateContent?alt=sse`.
//!
//! Each event's data is one JSON `GenerateContentResponse`:
//! ```text
//! data: {"candidates":[{"content":{"parts":[{"text":"Hello"}],"role":"model"}}]}
//!
//! data: {"candidates":[{"content":{"parts":[{"text":"!"}],"role":"model"},"finishReason":"STOP"}]}
//! ```
//! An `error` object may appear mid-stream and ends it.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;

use emissary_core::llm::ChunkStream;
use emissary_types::llm::{LlmError, ModelChunk};

use super::types::GenerateContentResponse;

/// Parse one SSE data payload.
///
/// Returns `Ok(None)` for empty payloads and the `[DONE]` sentinel.
pub fn parse_sse_data(data: &str) -> Result<Option<ModelChunk>, LlmError> {
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| LlmError::Deserialization(format!("invalid SSE payload: {e}: {data}")))?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        let status = error.get("status").and_then(|s| s.as_str()).unwrap_or("");
        return Err(LlmError::Provider {
            message: format!("{status} {message}").trim().to_string(),
        });
    }

    let response: GenerateContentResponse = serde_json::from_value(value)
        .map_err(|e| LlmError::Deserialization(format!("unexpected response shape: {e}")))?;
    Ok(Some(response.into_chunk()))
}

/// Map a non-success HTTP status to an [`LlmError`].
pub fn map_status(status: u16, model: &str, body: String) -> LlmError {
    match status {
        400 => LlmError::InvalidRequest(body),
        401 | 403 => LlmError::AuthenticationFailed,
        404 => LlmError::ModelNotFound(model.to_string()),
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// Send `request` and stream its SSE events as chunks.
///
/// The request is only sent when the stream is first polled.
pub fn create_gemini_stream(request: reqwest::RequestBuilder, model: String) -> ChunkStream {
    Box::pin(async_stream::try_stream! {
        let response = request.send().await.map_err(|e| LlmError::Provider {
            message: format!("HTTP request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            Err::<(), LlmError>(map_status(status.as_u16(), &model, body))?;
        } else {
            let mut events = std::pin::pin!(response.bytes_stream().eventsource());
            while let Some(event) = events.next().await {
                let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
                if let Some(chunk) = parse_sse_data(&event.data)? {
                    yield chunk;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_and_done() {
        assert!(parse_sse_data("").unwrap().is_none());
        assert!(parse_sse_data("  \n").unwrap().is_none());
        assert!(parse_sse_data("[DONE]").unwrap().is_none());
    }

    #[test]
    fn test_parse_text() {
        let chunk = parse_sse_data(r#"{"candidates":[{"content":{"parts":[{"text":"Hi"}]}}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chunk.text.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_parse_error_object() {
        let err = parse_sse_data(
            r#"{"error":{"code":500,"message":"internal","status":"INTERNAL"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LlmError::Provider { message } if message == "INTERNAL internal"));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_sse_data("{not json").unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }

    #[test]
    fn test_map_status() {
        assert!(matches!(
            map_status(401, "m", String::new()),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            map_status(404, "gemini-x", String::new()),
            LlmError::ModelNotFound(m) if m == "gemini-x"
        ));
        assert!(matches!(
            map_status(429, "m", String::new()),
            LlmError::RateLimited { .. }
        ));
        assert!(matches!(
            map_status(400, "m", "bad".to_string()),
            LlmError::InvalidRequest(b) if b == "bad"
        ));
        assert!(matches!(
            map_status(503, "m", "down".to_string()),
            LlmError::Provider { message } if message == "HTTP 503: down"
        ));
    }
}
