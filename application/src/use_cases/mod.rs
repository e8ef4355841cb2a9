//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod provider_selector;
pub mod provider_status;
pub mod run_turn;
pub(crate) mod tool_helpers;
