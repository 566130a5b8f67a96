//! Streaming relay: consumes a model stream and hands text to the caller.
//!
//! Two equivalent forms with the same ordering and skip rules:
//! - push: [`relay_stream`] drives a [`StreamCallback`] and returns the
//!   accumulated answer;
//! - pull: [`token_stream`] adapts a chunk stream into a stream of text.
//!
//! Skip rules: chunks without text (or with empty text) are ignored. A chunk
//! whose text cannot be read, or whose delivery fails, is logged and dropped
//! without touching the accumulator. Neither aborts the stream.

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;

use emissary_types::error::TokenError;
use emissary_types::llm::{LlmError, ModelChunk, ModelResponse};

/// Receiver of streamed output.
pub trait StreamCallback: Send {
    /// Called once per non-empty chunk, in stream order.
    fn on_token(&mut self, token: &str) -> Result<(), TokenError>;

    /// Called exactly once after the stream ends, also when it ended on an
    /// upstream error.
    fn on_complete(&mut self, response: &ModelResponse);
}

/// Drive `stream` to exhaustion, relaying text to `callback`.
///
/// Returns the concatenation of the successfully delivered tokens. An
/// upstream stream error stops consumption; `on_complete` still runs (with
/// `response.error` set) before the error is returned.
pub async fn relay_stream<S, C>(
    model: &str,
    mut stream: S,
    callback: &mut C,
) -> Result<String, LlmError>
where
    S: Stream<Item = Result<ModelChunk, LlmError>> + Unpin,
    C: StreamCallback + ?Sized,
{
    let mut response = ModelResponse::new(model);
    let mut answer = String::new();
    let mut failure = None;

    while let Some(item) = stream.next().await {
        let chunk = match item {
            Ok(chunk) => chunk,
            Err(err) => {
                response.error = Some(err.to_string());
                failure = Some(err);
                break;
            }
        };

        match chunk.try_text() {
            Ok(Some(text)) if !text.is_empty() => match callback.on_token(text) {
                Ok(()) => answer.push_str(text),
                Err(err) => tracing::error!("Error generating chunk: {err}"),
            },
            Ok(_) => {}
            Err(err) => tracing::error!("Error generating chunk: {err}"),
        }

        response.push(chunk);
    }

    callback.on_complete(&response);
    tracing::debug!(
        model,
        chunks = response.chunks.len(),
        finish_reason = ?response.finish_reason,
        "model response complete"
    );

    match failure {
        Some(err) => Err(err),
        None => Ok(answer),
    }
}

/// Pull-style relay: yields each non-empty chunk text.
///
/// Unreadable chunks are logged and skipped; an upstream error is yielded
/// and ends the stream.
pub fn token_stream<S>(stream: S) -> impl Stream<Item = Result<String, LlmError>> + Send + 'static
where
    S: Stream<Item = Result<ModelChunk, LlmError>> + Send + 'static,
{
    async_stream::try_stream! {
        for await item in stream {
            let chunk = item?;
            match chunk.try_text() {
                Ok(Some(text)) if !text.is_empty() => {
                    yield text.to_string();
                }
                Ok(_) => {}
                Err(err) => tracing::error!("Error generating chunk: {err}"),
            }
        }
    }
}

/// Callback that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallback;

impl StreamCallback for NoopCallback {
    fn on_token(&mut self, _token: &str) -> Result<(), TokenError> {
        Ok(())
    }

    fn on_complete(&mut self, _response: &ModelResponse) {}
}

/// Callback that keeps every token and the final response.
#[derive(Debug, Default)]
pub struct CollectingCallback {
    pub tokens: Vec<String>,
    pub response: Option<ModelResponse>,
    pub completions: usize,
}

impl StreamCallback for CollectingCallback {
    fn on_token(&mut self, token: &str) -> Result<(), TokenError> {
        self.tokens.push(token.to_string());
        Ok(())
    }

    fn on_complete(&mut self, response: &ModelResponse) {
        self.completions += 1;
        self.response = Some(response.clone());
    }
}

/// Callback forwarding tokens into an unbounded channel.
///
/// Lets a consumer read the tokens as a stream while the relay runs in
/// another task. A dropped receiver makes `on_token` fail with
/// [`TokenError::ReceiverClosed`].
#[derive(Debug)]
pub struct ChannelCallback {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelCallback {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }
}

impl StreamCallback for ChannelCallback {
    fn on_token(&mut self, token: &str) -> Result<(), TokenError> {
        self.tx
            .send(token.to_string())
            .map_err(|_| TokenError::ReceiverClosed)
    }

    fn on_complete(&mut self, response: &ModelResponse) {
        tracing::debug!(chunks = response.chunks.len(), "stream complete");
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;

    fn chunks(items: Vec<Option<&str>>) -> Vec<Result<ModelChunk, LlmError>> {
        items
            .into_iter()
            .map(|t| Ok(t.map(ModelChunk::text).unwrap_or_else(ModelChunk::empty)))
            .collect()
    }

    /// Records calls in order; fails `on_token` for the listed call numbers (1-based).
    #[derive(Default)]
    struct ScriptedCallback {
        events: Vec<String>,
        fail_on: Vec<usize>,
        calls: usize,
    }

    impl StreamCallback for ScriptedCallback {
        fn on_token(&mut self, token: &str) -> Result<(), TokenError> {
            self.calls += 1;
            if self.fail_on.contains(&self.calls) {
                return Err(TokenError::Invalid(token.to_string()));
            }
            self.events.push(format!("token:{token}"));
            Ok(())
        }

        fn on_complete(&mut self, response: &ModelResponse) {
            self.events.push(format!("complete:{}", response.chunks.len()));
        }
    }

    #[tokio::test]
    async fn test_relay_skips_empty_chunks() {
        let s = stream::iter(chunks(vec![Some("He"), Some("llo"), None, Some("!")]));
        let mut cb = ScriptedCallback::default();

        let answer = relay_stream("m", s, &mut cb).await.unwrap();

        assert_eq!(answer, "Hello!");
        assert_eq!(
            cb.events,
            vec!["token:He", "token:llo", "token:!", "complete:4"]
        );
    }

    #[tokio::test]
    async fn test_relay_skips_empty_string_chunk() {
        let s = stream::iter(chunks(vec![Some(""), Some("ok")]));
        let mut cb = CollectingCallback::default();

        let answer = relay_stream("m", s, &mut cb).await.unwrap();

        assert_eq!(answer, "ok");
        assert_eq!(cb.tokens, vec!["ok"]);
    }

    #[tokio::test]
    async fn test_failed_delivery_drops_chunk_and_continues() {
        let s = stream::iter(chunks(vec![Some("He"), Some("llo"), Some("!")]));
        let mut cb = ScriptedCallback {
            fail_on: vec![2],
            ..ScriptedCallback::default()
        };

        let answer = relay_stream("m", s, &mut cb).await.unwrap();

        assert_eq!(answer, "He!");
        assert_eq!(cb.events, vec!["token:He", "token:!", "complete:3"]);
    }

    #[tokio::test]
    async fn test_blocked_chunk_is_skipped() {
        let s = stream::iter(vec![
            Ok(ModelChunk::text("safe")),
            Ok(ModelChunk::blocked("SAFETY")),
            Ok(ModelChunk::text(" end")),
        ]);
        let mut cb = CollectingCallback::default();

        let answer = relay_stream("m", s, &mut cb).await.unwrap();

        assert_eq!(answer, "safe end");
        assert_eq!(cb.completions, 1);
        let response = cb.response.unwrap();
        assert_eq!(response.chunks.len(), 3);
        assert_eq!(response.finish_reason.as_deref(), Some("SAFETY"));
    }

    #[tokio::test]
    async fn test_upstream_error_still_completes_once() {
        let s = stream::iter(vec![
            Ok(ModelChunk::text("partial")),
            Err(LlmError::Stream("connection reset".to_string())),
            Ok(ModelChunk::text("never")),
        ]);
        let mut cb = CollectingCallback::default();

        let err = relay_stream("m", s, &mut cb).await.unwrap_err();

        assert!(matches!(err, LlmError::Stream(_)));
        assert_eq!(cb.tokens, vec!["partial"]);
        assert_eq!(cb.completions, 1);
        let response = cb.response.unwrap();
        assert_eq!(response.error.as_deref(), Some("stream error: connection reset"));
        assert_eq!(response.model, "m");
    }

    #[tokio::test]
    async fn test_empty_stream_completes_once() {
        let mut cb = CollectingCallback::default();
        let answer = relay_stream("m", stream::iter(Vec::new()), &mut cb)
            .await
            .unwrap();
        assert_eq!(answer, "");
        assert_eq!(cb.completions, 1);
    }

    #[tokio::test]
    async fn test_token_stream_matches_push_relay() {
        let s = stream::iter(vec![
            Ok(ModelChunk::text("He")),
            Ok(ModelChunk::text("llo")),
            Ok(ModelChunk::empty()),
            Ok(ModelChunk::blocked("SAFETY")),
            Ok(ModelChunk::text("!")),
        ]);
        let tokens: Vec<String> = token_stream(s)
            .map(|t| t.unwrap())
            .collect()
            .await;
        assert_eq!(tokens, vec!["He", "llo", "!"]);
    }

    #[tokio::test]
    async fn test_token_stream_yields_upstream_error() {
        let s = stream::iter(vec![
            Ok(ModelChunk::text("a")),
            Err(LlmError::AuthenticationFailed),
        ]);
        let items: Vec<_> = token_stream(s).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "a");
        assert!(matches!(items[1], Err(LlmError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_channel_callback_forwards_tokens() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut cb = ChannelCallback::new(tx);
        let s = stream::iter(chunks(vec![Some("a"), Some("b")]));

        let answer = relay_stream("m", s, &mut cb).await.unwrap();

        assert_eq!(answer, "ab");
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        assert_eq!(rx.recv().await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_channel_callback_closed_receiver_is_non_fatal() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut cb = ChannelCallback::new(tx);
        let s = stream::iter(chunks(vec![Some("a")]));

        let answer = relay_stream("m", s, &mut cb).await.unwrap();

        assert_eq!(answer, "");
    }
}
