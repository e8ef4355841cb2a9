//! Tool domain value objects: the output side of a tool call.
//!
//! Every [`ToolCall`](super::entities::ToolCall) produces exactly one
//! [`ToolResult`]. Failures never escape as Rust errors past the executor;
//! they are folded into the result payload as `{"error": "..."}` so the model
//! can read them in its second round.
//!
//! | Category | Raised when |
//! |----------|-------------|
//! | `Argument` | arguments are not a JSON object, a field is missing or malformed |
//! | `Authorization` | a protected tool is called without a credential |
//! | `UnknownTool` | the model names a tool outside the catalog |
//! | `Backend` | the family backend failed or returned a non-success status |
//! | `Timeout` | the backend call exceeded its deadline |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of a [`ToolError`], used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Argument,
    Authorization,
    UnknownTool,
    Backend,
    Timeout,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Argument => "argument",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::UnknownTool => "unknown_tool",
            ErrorCategory::Backend => "backend",
            ErrorCategory::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error produced while executing a tool call.
///
/// The `Display` text is exactly what lands in the result payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid JSON arguments for tool '{tool}'")]
    InvalidJson { tool: String },

    #[error("missing '{field}' argument for '{tool}'")]
    MissingArgument { tool: String, field: String },

    #[error("invalid '{field}' argument for '{tool}': {reason}")]
    InvalidArgument {
        tool: String,
        field: String,
        reason: String,
    },

    #[error("not authenticated for tool '{tool}'")]
    NotAuthenticated { tool: String },

    #[error("unknown tool: '{tool}'")]
    UnknownTool { tool: String },

    #[error("{0}")]
    Backend(String),

    #[error("timeout")]
    Timeout,
}

impl ToolError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ToolError::InvalidJson { .. }
            | ToolError::MissingArgument { .. }
            | ToolError::InvalidArgument { .. } => ErrorCategory::Argument,
            ToolError::NotAuthenticated { .. } => ErrorCategory::Authorization,
            ToolError::UnknownTool { .. } => ErrorCategory::UnknownTool,
            ToolError::Backend(_) => ErrorCategory::Backend,
            ToolError::Timeout => ErrorCategory::Timeout,
        }
    }
}

/// Outcome of one tool call, correlated to it by `tool_call_id`.
///
/// `payload` is JSON text: either the backend's value serialized verbatim,
/// or an object with a single `error` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub payload: String,
}

impl ToolResult {
    /// Wrap a backend value.
    pub fn success(tool_call_id: impl Into<String>, value: &serde_json::Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            payload: value.to_string(),
        }
    }

    /// Wrap an error as `{"error": "<message>"}`.
    pub fn failure(tool_call_id: impl Into<String>, error: &ToolError) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            payload: serde_json::json!({ "error": error.to_string() }).to_string(),
        }
    }

    /// Error message carried by the payload, if it is an error object.
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.payload).ok()?;
        value
            .as_object()
            .filter(|obj| obj.len() == 1)
            .and_then(|obj| obj.get("error"))
            .and_then(|e| e.as_str())
            .map(str::to_string)
    }

    pub fn is_error(&self) -> bool {
        self.error_message().is_some()
    }

    /// Payload parsed back into JSON; falls back to a JSON string if the
    /// payload is somehow not valid JSON.
    pub fn payload_value(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload)
            .unwrap_or_else(|_| serde_json::Value::String(self.payload.clone()))
    }
}
