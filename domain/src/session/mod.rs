//! Turn-scoped session domain.
//!
//! - [`response::ResponsePart`]: one element of a model response
//! - [`turn::Turn`]: the bounded two-phase state machine of one request
//! - [`turn::ToolRound`]: phase-1 calls paired with their results

pub mod response;
pub mod turn;
