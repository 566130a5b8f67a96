//! Configuration loader for Emissary.
//!
//! Reads `config.toml` from the data directory (`~/.emissary/` in production)
//! and deserializes it into [`EmissaryConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use emissary_types::config::EmissaryConfig;
use emissary_types::error::ConfigError;

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variables checked for the generative API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Resolve the data directory: `$EMISSARY_HOME`, else `~/.emissary`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("EMISSARY_HOME") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".emissary");
    }

    PathBuf::from(".emissary")
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`EmissaryConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and returns the default.
pub async fn load_config(path: &Path) -> EmissaryConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return EmissaryConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return EmissaryConfig::default();
        }
    };

    match toml::from_str::<EmissaryConfig>(&content) {
        Ok(config) => {
            tracing::info!(
                path = %path.display(),
                vacs = config.vac.len(),
                "Loaded configuration"
            );
            config
        }
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            EmissaryConfig::default()
        }
    }
}

/// Read the API key from the process environment.
pub fn resolve_api_key() -> Result<SecretString, ConfigError> {
    api_key_from(|name| std::env::var(name).ok())
}

/// First non-empty value among [`API_KEY_VARS`] according to `lookup`.
pub fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<SecretString, ConfigError> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingApiKey(API_KEY_VARS.join(" or ")))
}
