//! Observability for Emissary: subscriber setup and the span-backed tracer.

pub mod genai_attrs;
pub mod span_tracer;
pub mod tracing_setup;

pub use span_tracer::{SpanTrace, SpanTracer};
