//! Configuration resolution contract.

use emissary_types::config::{EmissaryConfig, VacConfig};
use emissary_types::error::ConfigError;

/// Looks up the settings of a VAC by its configuration identifier.
pub trait ConfigResolver: Send + Sync {
    fn resolve(&self, vector_name: &str) -> Result<VacConfig, ConfigError>;
}

impl ConfigResolver for EmissaryConfig {
    fn resolve(&self, vector_name: &str) -> Result<VacConfig, ConfigError> {
        self.resolve_vac(vector_name)
    }
}
