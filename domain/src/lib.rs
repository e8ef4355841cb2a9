//! Domain layer for family-assistant
//!
//! This crate contains the core concepts of a tool-using turn, with no
//! dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Turn
//!
//! A turn answers one prompt with at most two model round trips:
//!
//! - **Phase 1**: the model sees the prompt and the tool catalog, and either
//!   answers directly or asks for tool calls
//! - **Phase 2**: the model sees the tool results and writes the answer
//!
//! ## Tools
//!
//! A fixed catalog of family/member/event lookups. Arguments arrive as
//! untrusted JSON and are decoded into typed requests.

pub mod core;
pub mod providers;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use crate::core::{credential::Credential, error::DomainError};
pub use providers::{ConfigurationError, ProviderKind};
pub use session::{
    response::ResponsePart,
    turn::{
        MAX_ADAPTER_ROUNDS, PROTOCOL_VIOLATION_NOTICE, Phase2Disposition, ToolRound, Turn,
        TurnError, TurnState,
    },
};
pub use tool::{
    arguments::{
        CatalogTool, GetEventArgs, GetFamilyArgs, GetMemberArgs, SearchEventsArgs,
        SearchFamilyArgs, SearchMembersArgs, ToolRequest, parse_arguments,
    },
    entities::{ParamType, ParameterSpec, ToolCall, ToolCatalog, ToolDefinition, ToolParameters},
    value_objects::{ErrorCategory, ToolError, ToolResult},
};
