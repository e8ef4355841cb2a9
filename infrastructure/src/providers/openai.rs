//! OpenAI chat completions adapter.
//!
//! Streams `POST {base}/chat/completions` as server-sent events. Text deltas
//! are forwarded as they arrive; tool-call deltas are accumulated per index
//! and emitted as one `ToolCallRequest` once the stream ends.

use super::{
    ProviderError, RemoteProviderConfig, SYSTEM_PROMPT, build_http_client, ensure_success,
    error_part, status_line, synthesized_call_id,
};
use crate::tools::JsonSchemaToolConverter;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use kin_application::ports::provider_adapter::{
    GenerateRequest, PartSender, ProviderAdapter, ResponseStream,
};
use kin_domain::{ProviderKind, ResponsePart, ToolCall};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiAdapter {
    config: RemoteProviderConfig,
    client: Client,
}

impl OpenAiAdapter {
    pub fn new(config: RemoteProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client()?,
            config,
        })
    }

    fn build_body(&self, request: &GenerateRequest) -> Value {
        let mut messages = vec![
            json!({ "role": "system", "content": SYSTEM_PROMPT }),
            json!({ "role": "user", "content": request.prompt }),
        ];

        if let Some(round) = &request.tool_round {
            let tool_calls: Vec<Value> = round
                .calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.function_name,
                            "arguments": call.function_args,
                        }
                    })
                })
                .collect();
            let content = (!round.preamble.is_empty()).then(|| round.preamble.clone());
            messages.push(json!({
                "role": "assistant",
                "content": content,
                "tool_calls": tool_calls,
            }));
            for (call, result) in round.pairs() {
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": result.payload,
                }));
            }
        }

        let tools: Vec<Value> = JsonSchemaToolConverter::default()
            .catalog_schema(&request.catalog)
            .into_iter()
            .map(|function| json!({ "type": "function", "function": function }))
            .collect();

        json!({
            "model": self.config.model,
            "stream": true,
            "messages": messages,
            "tools": tools,
        })
    }

    async fn probe(&self) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(format!("model {}", self.config.model))
    }
}

/// Request the completion and forward its parts until the stream ends or
/// the consumer goes away.
async fn stream_completion(
    client: Client,
    url: String,
    api_key: String,
    body: Value,
    tx: &PartSender,
) -> Result<(), ProviderError> {
    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;
    let response = ensure_success(response).await?;

    let mut events = response.bytes_stream().eventsource();
    let mut pending = ToolCallAccumulator::default();

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| ProviderError::Stream(e.to_string()))?;
        if event.data == "[DONE]" {
            break;
        }
        let chunk: StreamChunk = match serde_json::from_str(&event.data) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("Skipping unparseable chunk: {}", e);
                continue;
            }
        };
        for choice in chunk.choices {
            if let Some(text) = choice.delta.content
                && !text.is_empty()
                && tx.send(ResponsePart::Text(text)).await.is_err()
            {
                return Ok(());
            }
            for delta in choice.delta.tool_calls.unwrap_or_default() {
                pending.absorb(delta);
            }
        }
    }

    let calls = pending.finish();
    if !calls.is_empty() {
        let _ = tx.send(ResponsePart::ToolCallRequest(calls)).await;
    }
    Ok(())
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn generate_stream(&self, request: GenerateRequest) -> ResponseStream {
        let body = self.build_body(&request);
        let client = self.client.clone();
        let url = format!("{}/chat/completions", self.config.base_url);
        let api_key = self.config.api_key.clone();
        debug!(
            model = %self.config.model,
            phase2 = request.is_phase2(),
            "OpenAI chat completion"
        );

        let (tx, stream) = ResponseStream::channel();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = tx.closed() => {
                    debug!("Consumer gone, abandoning completion stream");
                    return;
                }
                outcome = stream_completion(client, url, api_key, body, &tx) => outcome,
            };
            if let Err(e) = outcome {
                warn!(provider = "openai", "Provider request failed: {}", e);
                let _ = tx.send(error_part(ProviderKind::OpenAi, &e)).await;
            }
        });
        stream
    }

    async fn status(&self) -> String {
        status_line(ProviderKind::OpenAi, self.probe().await)
    }
}

// ==================== Tool call accumulation ====================

#[derive(Debug, Default)]
struct PendingCall {
    id: String,
    name: String,
    arguments: String,
}

/// Reassembles streamed tool calls. The first delta of an index carries the
/// id and name; later deltas append argument fragments.
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    calls: BTreeMap<usize, PendingCall>,
}

impl ToolCallAccumulator {
    fn absorb(&mut self, delta: StreamToolCall) {
        let entry = self.calls.entry(delta.index).or_default();
        if let Some(id) = delta.id
            && !id.is_empty()
        {
            entry.id = id;
        }
        if let Some(function) = delta.function {
            if let Some(name) = function.name
                && !name.is_empty()
            {
                entry.name = name;
            }
            if let Some(fragment) = function.arguments {
                entry.arguments.push_str(&fragment);
            }
        }
    }

    /// Completed calls in index order. Nameless entries are dropped.
    fn finish(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .filter(|(_, call)| !call.name.is_empty())
            .map(|(index, call)| {
                let id = if call.id.is_empty() {
                    synthesized_call_id(index)
                } else {
                    call.id
                };
                ToolCall::new(id, call.name, call.arguments)
            })
            .collect()
    }
}

// ==================== Wire types ====================

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<StreamToolCall>>,
}

#[derive(Debug, Deserialize)]
struct StreamToolCall {
    index: usize,
    id: Option<String>,
    function: Option<StreamFunction>,
}

#[derive(Debug, Deserialize)]
struct StreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::default_tool_catalog;
    use kin_domain::{ToolResult, ToolRound};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> OpenAiAdapter {
        OpenAiAdapter::new(RemoteProviderConfig::new("sk-test", server.uri(), "gpt-test")).unwrap()
    }

    fn sse(chunks: &[Value]) -> String {
        let mut body = String::new();
        for chunk in chunks {
            body.push_str(&format!("data: {}\n\n", chunk));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    fn delta(delta: Value) -> Value {
        json!({ "choices": [{ "index": 0, "delta": delta, "finish_reason": null }] })
    }

    async fn mount_stream(server: &MockServer, body: String) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_text_deltas_are_forwarded() {
        let server = MockServer::start().await;
        mount_stream(
            &server,
            sse(&[
                delta(json!({ "role": "assistant", "content": "" })),
                delta(json!({ "content": "Hello" })),
                delta(json!({ "content": " world" })),
            ]),
        )
        .await;

        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase1("hi", default_tool_catalog()))
            .collect_parts()
            .await;

        assert_eq!(
            parts,
            vec![ResponsePart::text("Hello"), ResponsePart::text(" world")]
        );
    }

    #[tokio::test]
    async fn test_tool_call_deltas_are_accumulated() {
        let server = MockServer::start().await;
        mount_stream(
            &server,
            sse(&[
                delta(json!({ "tool_calls": [
                    { "index": 0, "id": "call_abc", "type": "function",
                      "function": { "name": "search_family", "arguments": "" } }
                ]})),
                delta(json!({ "tool_calls": [
                    { "index": 0, "function": { "arguments": "{\"query\":" } }
                ]})),
                delta(json!({ "tool_calls": [
                    { "index": 1, "id": "call_def",
                      "function": { "name": "get_event", "arguments": "{}" } },
                    { "index": 0, "function": { "arguments": "\"Nguyen\"}" } }
                ]})),
            ]),
        )
        .await;

        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase1("hi", default_tool_catalog()))
            .collect_parts()
            .await;

        assert_eq!(
            parts,
            vec![ResponsePart::ToolCallRequest(vec![
                ToolCall::new("call_abc", "search_family", r#"{"query":"Nguyen"}"#),
                ToolCall::new("call_def", "get_event", "{}"),
            ])]
        );
    }

    #[tokio::test]
    async fn test_phase2_messages() {
        let server = MockServer::start().await;
        mount_stream(&server, sse(&[delta(json!({ "content": "Done." }))])).await;

        let round = ToolRound {
            preamble: "Let me look.".to_string(),
            calls: vec![ToolCall::new("call_abc", "search_family", r#"{"query":"N"}"#)],
            results: vec![ToolResult::success("call_abc", &json!({ "id": "f1" }))],
        };
        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase2("hi", default_tool_catalog(), round))
            .collect_parts()
            .await;
        assert_eq!(parts, vec![ResponsePart::text("Done.")]);

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2]["content"], "Let me look.");
        assert_eq!(messages[2]["tool_calls"][0]["id"], "call_abc");
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_call_id"], "call_abc");
        assert_eq!(messages[3]["content"], r#"{"id":"f1"}"#);
        assert_eq!(body["stream"], true);
        assert_eq!(body["tools"][0]["type"], "function");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Incorrect API key"))
            .mount(&server)
            .await;

        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase1("hi", default_tool_catalog()))
            .collect_parts()
            .await;

        assert_eq!(
            parts,
            vec![ResponsePart::text(
                "Error: OpenAI request failed: HTTP 401: Incorrect API key"
            )]
        );
    }

    #[test]
    fn test_accumulator_synthesizes_missing_ids_and_drops_nameless() {
        let mut acc = ToolCallAccumulator::default();
        acc.absorb(StreamToolCall {
            index: 2,
            id: None,
            function: Some(StreamFunction {
                name: Some("get_family".into()),
                arguments: Some("{}".into()),
            }),
        });
        acc.absorb(StreamToolCall {
            index: 0,
            id: Some("x".into()),
            function: None,
        });

        assert_eq!(acc.finish(), vec![ToolCall::new("call_3", "get_family", "{}")]);
    }

    #[tokio::test]
    async fn test_status_unreachable() {
        let adapter =
            OpenAiAdapter::new(RemoteProviderConfig::new("k", "http://127.0.0.1:9", "m")).unwrap();
        assert!(adapter.status().await.starts_with("openai: unreachable ("));
    }
}
