//! Tool Executor port
//!
//! Defines the interface for executing model-issued tool calls.

use async_trait::async_trait;
use kin_domain::{Credential, ToolCall, ToolCatalog, ToolResult};

/// Port for tool execution
///
/// This port defines how the application layer executes tools.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// The catalog offered to the model
    fn catalog(&self) -> &ToolCatalog;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.catalog().contains(name)
    }

    /// Execute a tool call.
    ///
    /// Total: every input, however malformed, yields a [`ToolResult`]
    /// carrying `call.id`.
    async fn execute(&self, call: &ToolCall, credential: Option<&Credential>) -> ToolResult;
}
