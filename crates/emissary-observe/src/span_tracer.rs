//! [`Tracer`] backed by `tracing` spans.
//!
//! Each trace is one `emissary.trace` span. With the OpenTelemetry layer
//! installed (see [`crate::tracing_setup`]) the span is exported under the
//! trace name through `otel.name`.

use tracing::field::Empty;

use emissary_core::telemetry::{TraceHandle, Tracer};
use emissary_types::generate::ResponseMetadata;

use crate::genai_attrs::{
    EMISSARY_CONTENT_UNITS, EMISSARY_CONTENTS, EMISSARY_OUTPUT, EMISSARY_OUTPUT_LENGTH,
    EMISSARY_QUESTION, GEN_AI_AGENT_NAME, GEN_AI_OPERATION_NAME, GEN_AI_PROVIDER_NAME, OP_CHAT,
    PROVIDER_GEMINI,
};

/// Opens one span per traced request.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpanTracer;

impl SpanTracer {
    pub fn new() -> Self {
        Self
    }
}

/// An open trace span. Dropping it without [`TraceHandle::finish`] closes
/// the span without output fields.
#[derive(Debug)]
pub struct SpanTrace {
    id: String,
    span: tracing::Span,
}

impl Tracer for SpanTracer {
    type Handle = SpanTrace;

    fn start(&self, id: &str, name: &str) -> SpanTrace {
        let span = tracing::info_span!(
            "emissary.trace",
            otel.name = %name,
            trace_id = %id,
            gen_ai.operation.name = Empty,
            gen_ai.provider.name = Empty,
            gen_ai.agent.name = Empty,
            emissary.question = Empty,
            emissary.content_units = Empty,
            emissary.output_length = Empty,
            emissary.output = Empty,
            emissary.contents = Empty,
        );
        span.record(GEN_AI_OPERATION_NAME, OP_CHAT);
        span.record(GEN_AI_PROVIDER_NAME, PROVIDER_GEMINI);

        tracing::debug!(trace_id = %id, trace_name = %name, "Trace opened");
        SpanTrace {
            id: id.to_string(),
            span,
        }
    }
}

impl TraceHandle for SpanTrace {
    fn id(&self) -> &str {
        &self.id
    }

    fn span(&self) -> tracing::Span {
        self.span.clone()
    }

    fn finish(self, output: &str, metadata: &ResponseMetadata) {
        self.span
            .record(GEN_AI_AGENT_NAME, metadata.vector_name.as_str())
            .record(EMISSARY_QUESTION, metadata.question.as_str())
            .record(EMISSARY_CONTENT_UNITS, metadata.contents.len() as u64)
            .record(EMISSARY_OUTPUT_LENGTH, output.len() as u64)
            .record(EMISSARY_OUTPUT, output);

        match serde_json::to_string(&metadata.contents) {
            Ok(contents) => {
                self.span.record(EMISSARY_CONTENTS, contents.as_str());
            }
            Err(e) => tracing::warn!(trace_id = %self.id, "Failed to serialize trace contents: {e}"),
        }

        tracing::debug!(trace_id = %self.id, "Trace finished");
    }
}
