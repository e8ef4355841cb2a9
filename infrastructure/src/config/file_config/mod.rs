//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are converted to serde-free application types at the composition root.

mod backend;
mod logging;
mod providers;
mod timeouts;

pub use backend::FileBackendConfig;
pub use logging::FileLoggingConfig;
pub use providers::{FileGeminiConfig, FileOllamaConfig, FileOpenAiConfig, FileProvidersConfig};
pub use timeouts::FileTimeoutsConfig;

use kin_domain::ProviderKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems found by [`FileConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("providers.default: unknown provider '{0}'")]
    UnknownDefaultProvider(String),

    #[error("timeouts.{0} cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("{0}.base_url cannot be empty")]
    EmptyBaseUrl(&'static str),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// LLM provider settings
    pub providers: FileProvidersConfig,
    /// Family data service
    pub backend: FileBackendConfig,
    /// Turn deadlines
    pub timeouts: FileTimeoutsConfig,
    /// Log file output
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if ProviderKind::from_name(&self.providers.default).is_none() {
            issues.push(ConfigValidationError::UnknownDefaultProvider(
                self.providers.default.clone(),
            ));
        }

        for (field, secs) in [
            ("adapter_secs", self.timeouts.adapter_secs),
            ("tool_secs", self.timeouts.tool_secs),
            ("status_secs", self.timeouts.status_secs),
        ] {
            if secs == 0 {
                issues.push(ConfigValidationError::ZeroTimeout(field));
            }
        }

        for (section, url) in [
            ("backend", &self.backend.base_url),
            ("providers.gemini", &self.providers.gemini.base_url),
            ("providers.openai", &self.providers.openai.base_url),
            ("providers.ollama", &self.providers.ollama.base_url),
        ] {
            if url.trim().is_empty() {
                issues.push(ConfigValidationError::EmptyBaseUrl(section));
            }
        }

        issues
    }
}
