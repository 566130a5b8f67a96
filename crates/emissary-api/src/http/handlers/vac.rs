//! VAC endpoints.
//!
//! - `POST /vac/streaming/{vector_name}` streams tokens as `text/plain`,
//!   followed by the final payload between [`JSON_START`] and [`JSON_END`]
//!   unless `stream_only` is set.
//! - `POST /vac/{vector_name}` returns the final payload as JSON.

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::Instrument;
use uuid::Uuid;

use emissary_core::config::ConfigResolver;
use emissary_core::relay::{ChannelCallback, NoopCallback};
use emissary_types::content::{ChatTurn, HistoricEntry};
use emissary_types::document::DocumentRef;
use emissary_types::generate::{GenerateOptions, GenerateResult};

use crate::conversation::{HistoryItem, ensure_question, pair_history};
use crate::http::error::AppError;
use crate::state::AppState;

pub const JSON_START: &str = "###JSON_START###";
pub const JSON_END: &str = "###JSON_END###";

/// Request body shared by both VAC endpoints.
#[derive(Debug, Deserialize)]
pub struct VacRequest {
    pub user_input: String,
    #[serde(default)]
    pub chat_history: Vec<HistoryItem>,
    #[serde(default, rename = "humanChatHistory")]
    pub human_chat_history: Vec<HistoricEntry>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub trace_id: Option<String>,
    /// Skip the trailing JSON payload on the streaming endpoint.
    #[serde(default)]
    pub stream_only: bool,
}

/// A validated request, ready for `generate`.
struct Prepared {
    question: String,
    turns: Vec<ChatTurn>,
    options: GenerateOptions,
}

impl VacRequest {
    fn prepare(self) -> Result<Prepared, AppError> {
        if self.user_input.trim().is_empty() {
            return Err(AppError::Validation("user_input must not be empty".to_string()));
        }
        let question = self.user_input;

        let mut turns = pair_history(&self.chat_history);
        ensure_question(&mut turns, &question);

        Ok(Prepared {
            question,
            turns,
            options: GenerateOptions {
                trace_id: self.trace_id.filter(|id| !id.is_empty()),
                instructions: self.instructions,
                documents: self.documents,
                human_chat_history: self.human_chat_history,
            },
        })
    }
}

/// POST /vac/streaming/{vector_name}
///
/// Configuration is resolved before the response starts so a blank VAC name
/// is still a 400. Failures after that point are written into the stream.
pub async fn stream_vac(
    State(state): State<AppState>,
    Path(vector_name): Path<String>,
    Json(body): Json<VacRequest>,
) -> Result<Response, AppError> {
    let stream_only = body.stream_only;
    let prepared = body.prepare()?;
    state.config().resolve(&vector_name)?;

    let request_id = Uuid::now_v7();
    let span = tracing::info_span!("vac.stream", %request_id, %vector_name);
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let orchestrator = Arc::clone(&state.orchestrator);

    tokio::spawn(
        async move {
            let mut callback = ChannelCallback::new(tx.clone());
            let result = orchestrator
                .generate(
                    &prepared.question,
                    &vector_name,
                    &prepared.turns,
                    &mut callback,
                    prepared.options,
                )
                .await;

            match result {
                Ok(result) if !stream_only => match serde_json::to_string(&result) {
                    Ok(json) => {
                        let _ = tx.send(format!("{JSON_START}{json}{JSON_END}"));
                    }
                    Err(e) => tracing::error!("Failed to serialize result: {e}"),
                },
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Streaming generation failed: {e}");
                    let _ = tx.send(format!("\nError: {e}"));
                }
            }
        }
        .instrument(span),
    );

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}

/// POST /vac/{vector_name}
pub async fn invoke_vac(
    State(state): State<AppState>,
    Path(vector_name): Path<String>,
    Json(body): Json<VacRequest>,
) -> Result<Json<GenerateResult>, AppError> {
    let prepared = body.prepare()?;
    let request_id = Uuid::now_v7();

    let result = state
        .orchestrator
        .generate(
            &prepared.question,
            &vector_name,
            &prepared.turns,
            &mut NoopCallback,
            prepared.options,
        )
        .instrument(tracing::info_span!("vac.invoke", %request_id, %vector_name))
        .await?;

    Ok(Json(result))
}
