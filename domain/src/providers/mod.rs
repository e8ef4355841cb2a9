//! Provider kinds (provider-neutral, serde-free).
//!
//! The set of LLM backends is closed and known at compile time. Free-form
//! names from configuration or the command line are parsed into a
//! [`ProviderKind`] once, at the outer boundary; everything deeper works with
//! the enum.

use thiserror::Error;

/// Errors that end a turn before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The name matches no registered provider variant.
    #[error("Invalid AI provider '{0}'.")]
    UnknownProvider(String),
}

/// A registered LLM backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    /// Google Gemini (remote, batched)
    Gemini,
    /// OpenAI chat completions (remote, streaming)
    OpenAi,
    /// Ollama (local, batched)
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAi,
        ProviderKind::Ollama,
    ];

    /// Canonical lowercase name used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Human-facing name used in messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Ollama => "Ollama",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Gemini => &["gemini", "google"],
            ProviderKind::OpenAi => &["openai", "gpt"],
            ProviderKind::Ollama => &["ollama", "local", "localai"],
        }
    }

    /// Case-insensitive lookup over canonical names and aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.aliases().contains(&needle.as_str()))
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| ConfigurationError::UnknownProvider(s.trim().to_string()))
    }
}
