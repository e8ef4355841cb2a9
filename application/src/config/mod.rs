//! Application-level configuration.
//!
//! - [`TurnParams`]: deadlines for adapter streams, tool calls and status probes

pub mod turn_params;

pub use turn_params::TurnParams;
