//! Response parts emitted by a provider adapter.
//!
//! Whatever a vendor speaks (SSE deltas, a single JSON document, content
//! blocks), an adapter reduces it to a finite sequence of [`ResponsePart`]s:
//! plain text, or a batch of tool calls.

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// One element of a model response.
///
/// # Examples
///
/// ```
/// use kin_domain::session::response::ResponsePart;
/// use kin_domain::tool::ToolCall;
///
/// let text = ResponsePart::text("Let me look that up.");
/// assert_eq!(text.as_text(), Some("Let me look that up."));
///
/// let calls = ResponsePart::ToolCallRequest(vec![ToolCall::new(
///     "c1",
///     "search_family",
///     r#"{"query":"Nguyen"}"#,
/// )]);
/// assert_eq!(calls.tool_calls().map(|c| c.len()), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ResponsePart {
    /// A chunk of answer text.
    Text(String),
    /// The model wants these tools executed before it answers.
    ToolCallRequest(Vec<ToolCall>),
}

impl ResponsePart {
    pub fn text(text: impl Into<String>) -> Self {
        ResponsePart::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponsePart::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match self {
            ResponsePart::ToolCallRequest(calls) => Some(calls),
            _ => None,
        }
    }
}
