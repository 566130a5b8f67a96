//! Telemetry contract: one trace per traced request.
//!
//! The orchestrator only opens a trace when the caller supplies a trace id,
//! and only finishes a trace it opened.

use emissary_types::generate::ResponseMetadata;

/// Opens traces.
pub trait Tracer: Send + Sync {
    type Handle: TraceHandle;

    /// Open (or attach to) the trace `id`, labelled `name`.
    fn start(&self, id: &str, name: &str) -> Self::Handle;
}

/// An open trace.
pub trait TraceHandle: Send {
    fn id(&self) -> &str;

    /// Span the traced work runs inside. Disabled unless the tracer has one.
    fn span(&self) -> tracing::Span {
        tracing::Span::none()
    }

    /// Record the final answer and metadata, then close the trace.
    fn finish(self, output: &str, metadata: &ResponseMetadata);
}

/// Tracer that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

/// Handle returned by [`NoopTracer`].
#[derive(Debug)]
pub struct NoopTrace {
    id: String,
}

impl Tracer for NoopTracer {
    type Handle = NoopTrace;

    fn start(&self, id: &str, _name: &str) -> NoopTrace {
        NoopTrace { id: id.to_string() }
    }
}

impl TraceHandle for NoopTrace {
    fn id(&self) -> &str {
        &self.id
    }

    fn finish(self, _output: &str, _metadata: &ResponseMetadata) {}
}
