//! Application state wiring the orchestrator to its concrete adapters.
//!
//! The orchestrator is generic over its ports; `AppState` pins it to the
//! infra implementations and is shared read-only by the CLI and HTTP layers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use emissary_core::orchestrator::Orchestrator;
use emissary_infra::config::{CONFIG_FILE, load_config, resolve_api_key, resolve_data_dir};
use emissary_infra::document::StorageDocumentResolver;
use emissary_infra::llm::gemini::GeminiModelFactory;
use emissary_observe::SpanTracer;
use emissary_types::config::EmissaryConfig;

/// The orchestrator pinned to the infra adapters.
pub type ConcreteOrchestrator =
    Orchestrator<EmissaryConfig, GeminiModelFactory, StorageDocumentResolver, SpanTracer>;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
}

impl AppState {
    /// Load configuration, read the API key and wire the adapters.
    pub async fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path: PathBuf = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| resolve_data_dir().join(CONFIG_FILE));
        let config = load_config(&config_path).await;

        let api_key = resolve_api_key()?;
        let models = GeminiModelFactory::new(api_key, &config.gemini)?;

        Ok(Self::from_parts(config, models))
    }

    pub fn from_parts(config: EmissaryConfig, models: GeminiModelFactory) -> Self {
        let documents = StorageDocumentResolver::new(&config.storage);
        let orchestrator = Orchestrator::new(config, models, documents, SpanTracer::new());
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn config(&self) -> &EmissaryConfig {
        self.orchestrator.config()
    }
}
