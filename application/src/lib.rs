//! Application layer for family-assistant
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::TurnParams;
pub use ports::{
    family_backend::{BackendError, FamilyBackend},
    provider_adapter::{GenerateRequest, PartSender, ProviderAdapter, ResponseStream},
    tool_executor::ToolExecutorPort,
};
pub use use_cases::provider_selector::ProviderSelector;
pub use use_cases::provider_status::ProviderStatusUseCase;
pub use use_cases::run_turn::{AnswerStream, RunTurnInput, RunTurnUseCase};
