//! Tool domain module
//!
//! Defines how the model reaches family data: a fixed [`ToolCatalog`] of
//! [`ToolDefinition`]s is offered to the model, the model answers with
//! [`ToolCall`]s, and each call yields exactly one [`ToolResult`].
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolCatalog  │───▶│ ToolCall     │───▶│ ToolRequest  │───▶│ ToolResult   │
//! │ (offered)    │    │ (raw JSON)   │    │ (typed args) │    │ (payload)    │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! The catalog is the single source of truth for legal names. Models do
//! hallucinate names outside it, which is why decoding yields
//! [`ToolError::UnknownTool`] rather than assuming the name is valid.
//!
//! # Architecture
//!
//! - **Domain** (this module): definitions, typed argument decoding, no I/O
//! - **Application** (`ToolExecutorPort`): port trait for tool execution
//! - **Infrastructure** (`BackendToolExecutor`): dispatch to the family backend

pub mod arguments;
pub mod entities;
pub mod value_objects;

pub use arguments::{CatalogTool, ToolRequest, parse_arguments};
pub use entities::{ParamType, ParameterSpec, ToolCall, ToolCatalog, ToolDefinition, ToolParameters};
pub use value_objects::{ErrorCategory, ToolError, ToolResult};
