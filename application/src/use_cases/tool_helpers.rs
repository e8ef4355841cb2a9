//! Shared helpers for tool use cases.

use kin_domain::ToolCall;
use kin_domain::util::preview;

/// Argument keys worth showing in a log line, most telling first.
const PREVIEW_KEYS: [&str; 4] = ["query", "family_id", "member_id", "event_id"];

/// Extract a short preview string from tool call arguments.
///
/// Looks for well-known keys first, then falls back to a flattened preview of
/// the raw argument text (which may not even be JSON).
pub(crate) fn tool_args_preview(call: &ToolCall) -> String {
    if let Ok(serde_json::Value::Object(args)) =
        serde_json::from_str::<serde_json::Value>(&call.function_args)
    {
        for key in PREVIEW_KEYS {
            if let Some(serde_json::Value::String(s)) = args.get(key) {
                return preview(s, 50);
            }
        }
    }
    preview(&call.function_args, 50)
}
