//! Span attribute names recorded on request traces.
//!
//! `gen_ai.*` names follow the OpenTelemetry GenAI semantic conventions;
//! `emissary.*` names are specific to this service.

/// The name of the operation being performed.
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider.
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The configuration (VAC) that served the request.
pub const GEN_AI_AGENT_NAME: &str = "gen_ai.agent.name";

pub const EMISSARY_QUESTION: &str = "emissary.question";
pub const EMISSARY_CONTENT_UNITS: &str = "emissary.content_units";
pub const EMISSARY_OUTPUT_LENGTH: &str = "emissary.output_length";

/// The full answer text.
pub const EMISSARY_OUTPUT: &str = "emissary.output";

/// The content units sent to the model, as JSON.
pub const EMISSARY_CONTENTS: &str = "emissary.contents";

// --- Values ---

/// Chat completion operation.
pub const OP_CHAT: &str = "chat";

/// Google Gemini provider identifier.
pub const PROVIDER_GEMINI: &str = "gemini";
