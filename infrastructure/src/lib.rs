//! Infrastructure layer for family-assistant
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backend;
pub mod config;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use backend::RestFamilyBackend;
pub use config::{
    ConfigLoader, ConfigValidationError, FileBackendConfig, FileConfig, FileLoggingConfig,
    FileProvidersConfig, FileTimeoutsConfig,
};
pub use providers::{
    GeminiAdapter, LocalProviderConfig, OllamaAdapter, OpenAiAdapter, ProviderError,
    RemoteProviderConfig,
};
pub use tools::{BackendToolExecutor, JsonSchemaToolConverter, default_tool_catalog};
