//! Google Gemini client -- concrete [`ModelFactory`] / [`GenerativeModel`].
//!
//! Streams from `POST {base_url}/models/{model}:streamGenerateContent?alt=sse`.
//! The API key travels in the `x-goog-api-key` header; it is wrapped in
//! [`SecretString`] and never logged.

pub mod streaming;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use emissary_core::llm::{ChunkStream, GenerativeModel, ModelFactory};
use emissary_types::config::GeminiSettings;
use emissary_types::content::ContentUnit;
use emissary_types::llm::{LlmError, SafetySetting};

use streaming::create_gemini_stream;
use types::{GenerateContentRequest, SystemInstruction};

/// Bounds connection setup only. A stream may run as long as the model keeps
/// sending.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates [`GeminiModel`] handles sharing one HTTP client.
pub struct GeminiModelFactory {
    client: reqwest::Client,
    api_key: Arc<SecretString>,
    base_url: String,
}

impl GeminiModelFactory {
    /// Build a factory from the `[gemini]` settings.
    pub fn new(api_key: SecretString, settings: &GeminiSettings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key: Arc::new(api_key),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ModelFactory for GeminiModelFactory {
    type Model = GeminiModel;

    fn create_model(
        &self,
        name: &str,
        safety_settings: &[SafetySetting],
        system_instruction: &str,
    ) -> Result<GeminiModel, LlmError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LlmError::InvalidRequest("model name is empty".to_string()));
        }

        Ok(GeminiModel {
            client: self.client.clone(),
            api_key: Arc::clone(&self.api_key),
            base_url: self.base_url.clone(),
            name: name.to_string(),
            safety_settings: safety_settings.to_vec(),
            system_instruction: SystemInstruction::text(system_instruction),
        })
    }
}

/// A Gemini model configured for one request.
pub struct GeminiModel {
    client: reqwest::Client,
    api_key: Arc<SecretString>,
    base_url: String,
    name: String,
    safety_settings: Vec<SafetySetting>,
    system_instruction: SystemInstruction,
}

impl GeminiModel {
    fn url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.name
        )
    }
}

impl GenerativeModel for GeminiModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_streaming(&self, contents: Vec<ContentUnit>) -> ChunkStream {
        let body = GenerateContentRequest {
            contents,
            system_instruction: self.system_instruction.clone(),
            safety_settings: self.safety_settings.clone(),
        };
        tracing::debug!(model = %self.name, units = body.contents.len(), "Gemini stream request");

        let request = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body);

        create_gemini_stream(request, self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use emissary_types::llm::{HarmBlockThreshold, ModelChunk};

    use super::*;

    fn factory(base_url: &str) -> GeminiModelFactory {
        GeminiModelFactory::new(
            SecretString::from("test-key-not-real"),
            &GeminiSettings {
                base_url: base_url.to_string(),
            },
        )
        .unwrap()
    }

    fn model(base_url: &str) -> GeminiModel {
        factory(base_url)
            .create_model(
                "gemini-1.5-flash",
                &SafetySetting::all(HarmBlockThreshold::BlockOnlyHigh),
                "system text",
            )
            .unwrap()
    }

    async fn collect(stream: ChunkStream) -> Vec<Result<ModelChunk, LlmError>> {
        stream.collect().await
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let f = factory("https://example.test/v1beta/");
        assert_eq!(f.base_url(), "https://example.test/v1beta");
        let m = f.create_model("gemini-1.5-pro", &[], "").unwrap();
        assert_eq!(
            m.url(),
            "https://example.test/v1beta/models/gemini-1.5-pro:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn test_empty_model_name_rejected() {
        let err = factory("https://example.test")
            .create_model(" ", &[], "")
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_streams_chunks_from_sse() {
        let server = MockServer::start().await;
        let sse_body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"He\"}],\"role\":\"model\"}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"llo\"}],\"role\":\"model\"}}]}\n\n",
            "data: {\"usageMetadata\":{\"promptTokenCount\":3}}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"!\"}],\"role\":\"model\"},\"finishReason\":\"STOP\"}]}\n\n",
        );

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", "test-key-not-real"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "systemInstruction": {"parts": [{"text": "system text"}]},
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body),
            )
            .mount(&server)
            .await;

        let chunks = collect(
            model(&server.uri()).generate_streaming(vec![ContentUnit::user_text("hello")]),
        )
        .await;

        let chunks: Vec<ModelChunk> = chunks.into_iter().map(|c| c.unwrap()).collect();
        let texts: Vec<Option<&str>> = chunks.iter().map(|c| c.text.as_deref()).collect();
        assert_eq!(texts, vec![Some("He"), Some("llo"), None, Some("!")]);
        assert_eq!(chunks[3].finish_reason.as_deref(), Some("STOP"));
    }

    #[tokio::test]
    async fn test_http_error_surfaces_as_first_item() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let items = collect(model(&server.uri()).generate_streaming(vec![])).await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(LlmError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_error_event_ends_stream() {
        let server = MockServer::start().await;
        let sse_body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"partial\"}]}}]}\n\n",
            "data: {\"error\":{\"code\":503,\"message\":\"overloaded\",\"status\":\"UNAVAILABLE\"}}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"never\"}]}}]}\n\n",
        );
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body),
            )
            .mount(&server)
            .await;

        let items = collect(model(&server.uri()).generate_streaming(vec![])).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().text.as_deref(), Some("partial"));
        assert!(matches!(
            &items[1],
            Err(LlmError::Provider { message }) if message == "UNAVAILABLE overloaded"
        ));
    }
}
