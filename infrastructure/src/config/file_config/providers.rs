//! Provider configuration from TOML (`[providers]` section)

use crate::providers::{
    GeminiAdapter, LocalProviderConfig, OllamaAdapter, OpenAiAdapter, ProviderError,
    RemoteProviderConfig, gemini, ollama, openai,
};
use kin_application::ProviderSelector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Look up an API key: the inline value wins, then the named env var.
fn resolve_api_key(inline: Option<&str>, env_var: &str) -> Option<String> {
    inline
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Gemini API provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: gemini::DEFAULT_BASE_URL.to_string(),
            model: gemini::DEFAULT_MODEL.to_string(),
        }
    }
}

impl FileGeminiConfig {
    /// `None` when no API key can be found; the provider is then unavailable.
    pub fn to_provider_config(&self) -> Option<RemoteProviderConfig> {
        let api_key = resolve_api_key(self.api_key.as_deref(), &self.api_key_env)?;
        Some(RemoteProviderConfig::new(api_key, &self.base_url, &self.model))
    }
}

/// OpenAI API provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API (can point at any compatible server).
    pub base_url: String,
    pub model: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: openai::DEFAULT_BASE_URL.to_string(),
            model: openai::DEFAULT_MODEL.to_string(),
        }
    }
}

impl FileOpenAiConfig {
    /// `None` when no API key can be found; the provider is then unavailable.
    pub fn to_provider_config(&self) -> Option<RemoteProviderConfig> {
        let api_key = resolve_api_key(self.api_key.as_deref(), &self.api_key_env)?;
        Some(RemoteProviderConfig::new(api_key, &self.base_url, &self.model))
    }
}

/// Ollama provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    /// Ollama needs no key, so it is registered unless disabled here.
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: ollama::DEFAULT_BASE_URL.to_string(),
            model: ollama::DEFAULT_MODEL.to_string(),
        }
    }
}

impl FileOllamaConfig {
    pub fn to_provider_config(&self) -> Option<LocalProviderConfig> {
        self.enabled
            .then(|| LocalProviderConfig::new(&self.base_url, &self.model))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Provider used when none is requested: "gemini", "openai" or "ollama"
    /// (aliases such as "google" or "local" are accepted).
    pub default: String,
    pub gemini: FileGeminiConfig,
    pub openai: FileOpenAiConfig,
    pub ollama: FileOllamaConfig,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            default: "gemini".to_string(),
            gemini: FileGeminiConfig::default(),
            openai: FileOpenAiConfig::default(),
            ollama: FileOllamaConfig::default(),
        }
    }
}

impl FileProvidersConfig {
    /// Build a selector holding every provider this configuration can reach.
    ///
    /// Hosted providers without an API key are left out, so naming them
    /// resolves like an unknown provider.
    pub fn build_selector(&self) -> Result<ProviderSelector, ProviderError> {
        let mut selector = ProviderSelector::new(&self.default);

        if let Some(config) = self.gemini.to_provider_config() {
            selector = selector.with_adapter(Arc::new(GeminiAdapter::new(config)?));
        } else {
            debug!("Gemini not registered: no API key in {}", self.gemini.api_key_env);
        }
        if let Some(config) = self.openai.to_provider_config() {
            selector = selector.with_adapter(Arc::new(OpenAiAdapter::new(config)?));
        } else {
            debug!("OpenAI not registered: no API key in {}", self.openai.api_key_env);
        }
        if let Some(config) = self.ollama.to_provider_config() {
            selector = selector.with_adapter(Arc::new(OllamaAdapter::new(config)?));
        }

        Ok(selector)
    }
}
