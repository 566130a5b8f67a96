//! The `generate` entry point.
//!
//! One call runs: resolve configuration, open the trace when a trace id was
//! given, compose the system instruction and instantiate the model, assemble
//! contents, relay the stream, finish the trace, return `{answer, metadata}`.
//!
//! No retries, timeouts or cancellation. Configuration, model and document
//! failures propagate to the caller; per-chunk delivery failures do not.

use tracing::Instrument;

use emissary_types::content::ChatTurn;
use emissary_types::error::GenerateError;
use emissary_types::generate::{GenerateOptions, GenerateResult, ResponseMetadata};

use crate::assembler::assemble_contents;
use crate::config::ConfigResolver;
use crate::document::DocumentResolver;
use crate::llm::{GenerativeModel, ModelFactory};
use crate::prompt::{compose_system_instruction, select_model};
use crate::relay::{StreamCallback, relay_stream};
use crate::telemetry::{TraceHandle, Tracer};

/// Orchestrates one chat generation over the four outbound ports.
///
/// Built once at startup and shared read-only between requests.
pub struct Orchestrator<C, F, D, T> {
    config: C,
    models: F,
    documents: D,
    tracer: T,
}

impl<C, F, D, T> Orchestrator<C, F, D, T>
where
    C: ConfigResolver,
    F: ModelFactory,
    D: DocumentResolver,
    T: Tracer,
{
    pub fn new(config: C, models: F, documents: D, tracer: T) -> Self {
        Self {
            config,
            models,
            documents,
            tracer,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Answer `question` for the VAC `vector_name`, streaming tokens to
    /// `callback` as they arrive.
    pub async fn generate<CB>(
        &self,
        question: &str,
        vector_name: &str,
        chat_history: &[ChatTurn],
        callback: &mut CB,
        options: GenerateOptions,
    ) -> Result<GenerateResult, GenerateError>
    where
        CB: StreamCallback + ?Sized,
    {
        let vac = self.config.resolve(vector_name)?;

        let trace = options.trace_id.as_deref().map(|id| {
            let trace = self.tracer.start(id, vac.trace_name());
            tracing::info!(trace_id = trace.id(), "Got trace: {}", trace.id());
            trace
        });

        let span = trace
            .as_ref()
            .map_or_else(tracing::Span::none, TraceHandle::span);

        let (answer, contents) = async {
            let system_instruction =
                compose_system_instruction(options.instructions.as_deref());
            let model = self.models.create_model(
                select_model(&vac),
                &vac.safety_settings(),
                &system_instruction,
            )?;

            let contents = assemble_contents(
                &options.human_chat_history,
                &options.documents,
                chat_history,
                &self.documents,
                vac.bucket(),
            )
            .await?;
            tracing::info!(
                vector_name,
                model = model.name(),
                units = contents.len(),
                "assembled contents"
            );
            tracing::debug!(contents = ?contents, "contents");

            let stream = model.generate_streaming(contents.clone());
            let answer = relay_stream(model.name(), stream, &mut *callback).await?;
            tracing::info!(vector_name, chars = answer.len(), "Got response");
            Ok::<_, GenerateError>((answer, contents))
        }
        .instrument(span)
        .await?;

        let metadata = ResponseMetadata {
            question: question.to_string(),
            vector_name: vector_name.to_string(),
            contents,
        };

        if let Some(trace) = trace {
            trace.finish(&answer, &metadata);
        }

        Ok(GenerateResult { answer, metadata })
    }
}
