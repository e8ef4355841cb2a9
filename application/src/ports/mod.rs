//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod family_backend;
pub mod provider_adapter;
pub mod tool_executor;
