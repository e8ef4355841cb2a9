//! LLM provider adapters
//!
//! Each adapter turns one vendor's chat API into the uniform
//! [`ResponseStream`] contract: `Text` parts and at most one
//! `ToolCallRequest` part per round.
//!
//! | Adapter   | Transport                          | Tool call ids |
//! |-----------|------------------------------------|---------------|
//! | Gemini    | batched `generateContent`          | synthesized   |
//! | OpenAI    | streamed `chat/completions` (SSE)  | vendor        |
//! | Ollama    | batched `/api/chat`                | synthesized   |
//!
//! Vendor and transport failures never escape an adapter. They are rendered
//! as a final `Text` part by [`error_part`].

pub mod gemini;
pub mod ollama;
pub mod openai;

use kin_application::ports::provider_adapter::ResponseStream;
use kin_domain::util::truncate_str;
use kin_domain::{ProviderKind, ResponsePart};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub use gemini::GeminiAdapter;
pub use ollama::OllamaAdapter;
pub use openai::OpenAiAdapter;

/// Shared system instruction for every provider.
pub const SYSTEM_PROMPT: &str = "You are a helpful family assistant. You answer questions about \
families, their members and family events by calling the provided tools. Call a tool whenever \
the answer depends on stored data and never invent ids, names or dates. When a tool result \
contains an \"error\" field, tell the user briefly what went wrong. Answer in the language of \
the user's question.";

/// Vendor error bodies are cut to this many bytes.
const MAX_ERROR_BODY: usize = 300;

/// Errors raised inside an adapter before they are rendered as text.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("stream interrupted: {0}")]
    Stream(String),
}

/// Connection settings for a hosted provider.
#[derive(Debug, Clone)]
pub struct RemoteProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl RemoteProviderConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }
}

/// Connection settings for a locally hosted provider.
#[derive(Debug, Clone)]
pub struct LocalProviderConfig {
    pub base_url: String,
    pub model: String,
}

impl LocalProviderConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }
}

/// HTTP client shared by all requests of one adapter.
///
/// Only the connect phase is bounded here; the turn applies its own deadline
/// to the whole generation.
pub(crate) fn build_http_client() -> Result<Client, ProviderError> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Pass successful responses through; turn anything else into
/// [`ProviderError::Status`] carrying a truncated body.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body: truncate_str(body.trim(), MAX_ERROR_BODY).to_string(),
    })
}

/// The single terminal part an adapter emits when a round fails.
pub(crate) fn error_part(kind: ProviderKind, error: &ProviderError) -> ResponsePart {
    ResponsePart::Text(format!(
        "Error: {} request failed: {}",
        kind.display_name(),
        error
    ))
}

/// Id for a tool call the vendor did not name.
pub(crate) fn synthesized_call_id(index: usize) -> String {
    format!("call_{}", index + 1)
}

/// One-line status report from a probe's outcome.
pub(crate) fn status_line(kind: ProviderKind, probe: Result<String, ProviderError>) -> String {
    match probe {
        Ok(detail) => format!("{}: reachable ({})", kind.as_str(), detail),
        Err(e @ ProviderError::Status { .. }) => format!("{}: unavailable ({})", kind.as_str(), e),
        Err(e) => format!("{}: unreachable ({})", kind.as_str(), e),
    }
}

/// Run a batched request on its own task and replay its parts.
///
/// The task stops early when the consumer drops the stream.
pub(crate) fn spawn_batched<F>(kind: ProviderKind, request: F) -> ResponseStream
where
    F: Future<Output = Result<Vec<ResponsePart>, ProviderError>> + Send + 'static,
{
    let (tx, stream) = ResponseStream::channel();

    tokio::spawn(async move {
        let parts = tokio::select! {
            _ = tx.closed() => {
                debug!(provider = kind.as_str(), "Consumer gone, dropping request");
                return;
            }
            result = request => match result {
                Ok(parts) => parts,
                Err(e) => {
                    warn!(provider = kind.as_str(), "Provider request failed: {}", e);
                    vec![error_part(kind, &e)]
                }
            },
        };

        for part in parts {
            if tx.send(part).await.is_err() {
                break;
            }
        }
    });

    stream
}

/// A tool result payload as a JSON value, for vendors that want structured
/// content rather than text.
pub(crate) fn payload_object(payload: serde_json::Value) -> serde_json::Value {
    match payload {
        serde_json::Value::Object(_) => payload,
        other => serde_json::json!({ "result": other }),
    }
}

/// The model's argument text as a JSON value, for vendors that echo
/// structured arguments back. Unparseable text becomes an empty object.
pub(crate) fn arguments_value(raw: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        _ => serde_json::json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_part_text() {
        let err = ProviderError::Status {
            status: 429,
            body: "quota exceeded".to_string(),
        };
        assert_eq!(
            error_part(ProviderKind::OpenAi, &err),
            ResponsePart::text("Error: OpenAI request failed: HTTP 429: quota exceeded")
        );
    }

    #[test]
    fn test_status_line() {
        assert_eq!(
            status_line(ProviderKind::Ollama, Ok("3 models".into())),
            "ollama: reachable (3 models)"
        );
        let unavailable = status_line(
            ProviderKind::Gemini,
            Err(ProviderError::Status {
                status: 404,
                body: "not found".into(),
            }),
        );
        assert_eq!(unavailable, "gemini: unavailable (HTTP 404: not found)");
    }

    #[test]
    fn test_synthesized_ids_are_one_based() {
        assert_eq!(synthesized_call_id(0), "call_1");
        assert_eq!(synthesized_call_id(2), "call_3");
    }

    #[test]
    fn test_payload_object_wraps_non_objects() {
        assert_eq!(payload_object(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(payload_object(json!([1, 2])), json!({"result": [1, 2]}));
    }

    #[test]
    fn test_arguments_value() {
        assert_eq!(arguments_value(r#"{"query":"x"}"#), json!({"query": "x"}));
        assert_eq!(arguments_value("{bad"), json!({}));
        assert_eq!(arguments_value("[1]"), json!({}));
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = LocalProviderConfig::new("http://localhost:11434/", "llama3.1");
        assert_eq!(config.base_url, "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_spawn_batched_replays_parts() {
        let stream = spawn_batched(ProviderKind::Ollama, async {
            Ok(vec![ResponsePart::text("a"), ResponsePart::text("b")])
        });
        assert_eq!(
            stream.collect_parts().await,
            vec![ResponsePart::text("a"), ResponsePart::text("b")]
        );
    }

    #[tokio::test]
    async fn test_spawn_batched_renders_failure() {
        let stream = spawn_batched(ProviderKind::Gemini, async {
            Err(ProviderError::InvalidResponse("no candidates".into()))
        });
        assert_eq!(
            stream.collect_parts().await,
            vec![ResponsePart::text(
                "Error: Gemini request failed: invalid response: no candidates"
            )]
        );
    }
}
