//! Configuration file loading for family-assistant
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `FAMILY_ASSISTANT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./family-assistant.toml` or `./.family-assistant.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/family-assistant/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBackendConfig, FileConfig, FileGeminiConfig, FileLoggingConfig,
    FileOllamaConfig, FileOpenAiConfig, FileProvidersConfig, FileTimeoutsConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
