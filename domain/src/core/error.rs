//! Domain error types

use crate::providers::ConfigurationError;
use crate::session::turn::TurnError;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Turn protocol error: {0}")]
    Turn(#[from] TurnError),
}
