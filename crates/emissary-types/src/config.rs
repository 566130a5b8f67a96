//! Configuration types for Emissary.
//!
//! `EmissaryConfig` is the top-level `config.toml`. Each `[vac.<name>]` table
//! configures one VAC (the configuration identifier callers pass as
//! `vector_name`). All fields have defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::llm::{DEFAULT_MODEL, HarmBlockThreshold, SafetySetting};

/// Bucket holding uploaded documents when neither the VAC nor `[storage]` names one.
pub const DEFAULT_BUCKET: &str = "multivac-internal-dev.firebasestorage.app";

/// Trace name used when a VAC does not set `trace_name`.
pub const DEFAULT_TRACE_NAME: &str = "emissary";

/// VAC looked up when the requested name has no table of its own. Without
/// it, such names get [`VacConfig::default()`].
pub const FALLBACK_VAC: &str = "default";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmissaryConfig {
    #[serde(default)]
    pub gemini: GeminiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub server: ServerSettings,

    /// Per-VAC settings keyed by `vector_name`.
    #[serde(default)]
    pub vac: BTreeMap<String, VacConfig>,
}

impl EmissaryConfig {
    /// Look up a VAC: its own table, else the `default` table, else all
    /// defaults. Only a blank name is rejected.
    ///
    /// The returned config has `bucket` filled in from `[storage]` when the
    /// VAC leaves it unset.
    pub fn resolve_vac(&self, vector_name: &str) -> Result<VacConfig, ConfigError> {
        if vector_name.trim().is_empty() {
            return Err(ConfigError::InvalidVacName(vector_name.to_string()));
        }

        let mut resolved = self
            .vac
            .get(vector_name)
            .or_else(|| self.vac.get(FALLBACK_VAC))
            .cloned()
            .unwrap_or_default();
        if resolved.bucket.is_none() {
            resolved.bucket = Some(self.storage.bucket.clone());
        }
        Ok(resolved)
    }
}

/// Generative API endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
        }
    }
}

/// Document storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Object storage download endpoint.
    #[serde(default = "default_storage_base_url")]
    pub base_url: String,

    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
}

fn default_storage_base_url() -> String {
    "https://firebasestorage.googleapis.com".to_string()
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_max_document_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            base_url: default_storage_base_url(),
            bucket: default_bucket(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

/// HTTP server defaults, overridable from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1956
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Settings of one VAC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacConfig {
    /// Model identifier. Unset means [`DEFAULT_MODEL`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_threshold: Option<HarmBlockThreshold>,

    /// Storage bucket for this VAC's documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_name: Option<String>,
}

impl VacConfig {
    /// The configured model, or the default identifier.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Safety settings for every harm category at the configured threshold.
    pub fn safety_settings(&self) -> Vec<SafetySetting> {
        SafetySetting::all(self.safety_threshold.unwrap_or_default())
    }

    pub fn bucket(&self) -> &str {
        self.bucket.as_deref().unwrap_or(DEFAULT_BUCKET)
    }

    pub fn trace_name(&self) -> &str {
        self.trace_name.as_deref().unwrap_or(DEFAULT_TRACE_NAME)
    }
}
