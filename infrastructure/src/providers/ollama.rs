//! Ollama adapter for locally hosted models.
//!
//! Batched `POST {base}/api/chat` with `stream: false` and `tools`. Ollama
//! returns tool calls without ids, so they are synthesized per round. Tool
//! results go back as `tool` role messages.

use super::{
    LocalProviderConfig, ProviderError, SYSTEM_PROMPT, arguments_value, build_http_client,
    ensure_success, spawn_batched, status_line, synthesized_call_id,
};
use crate::tools::JsonSchemaToolConverter;
use async_trait::async_trait;
use kin_application::ports::provider_adapter::{GenerateRequest, ProviderAdapter, ResponseStream};
use kin_domain::{ProviderKind, ResponsePart, ToolCall};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

pub struct OllamaAdapter {
    config: LocalProviderConfig,
    client: Client,
}

impl OllamaAdapter {
    pub fn new(config: LocalProviderConfig) -> Result<Self, ProviderError> {
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
                        "function": {
                            "name": call.function_name,
                            "arguments": arguments_value(&call.function_args),
                        }
                    })
                })
                .collect();
            messages.push(json!({
                "role": "assistant",
                "content": round.preamble,
                "tool_calls": tool_calls,
            }));
            for (_, result) in round.pairs() {
                messages.push(json!({ "role": "tool", "content": result.payload }));
            }
        }

        let tools: Vec<Value> = JsonSchemaToolConverter::default()
            .catalog_schema(&request.catalog)
            .into_iter()
            .map(|function| json!({ "type": "function", "function": function }))
            .collect();

        json!({
            "model": self.config.model,
            "stream": false,
            "messages": messages,
            "tools": tools,
        })
    }

    async fn probe(&self) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.config.base_url))
            .send()
            .await?;
        let tags: TagsResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let model = &self.config.model;
        let pulled = tags
            .models
            .iter()
            .any(|m| m.name == *model || m.name.strip_suffix(":latest") == Some(model.as_str()));
        if pulled {
            Ok(format!("{} models, using {}", tags.models.len(), model))
        } else {
            Ok(format!("{} models, '{}' not pulled", tags.models.len(), model))
        }
    }
}

fn into_parts(response: ChatResponse) -> Vec<ResponsePart> {
    let mut parts = Vec::new();
    if !response.message.content.is_empty() {
        parts.push(ResponsePart::Text(response.message.content));
    }

    let calls: Vec<ToolCall> = response
        .message
        .tool_calls
        .into_iter()
        .enumerate()
        .map(|(i, call)| {
            let args = if call.function.arguments.is_null() {
                "{}".to_string()
            } else {
                call.function.arguments.to_string()
            };
            ToolCall::new(synthesized_call_id(i), call.function.name, args)
        })
        .collect();
    if !calls.is_empty() {
        parts.push(ResponsePart::ToolCallRequest(calls));
    }
    parts
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn generate_stream(&self, request: GenerateRequest) -> ResponseStream {
        let body = self.build_body(&request);
        let client = self.client.clone();
        let url = format!("{}/api/chat", self.config.base_url);
        debug!(
            model = %self.config.model,
            phase2 = request.is_phase2(),
            "Ollama chat"
        );

        spawn_batched(ProviderKind::Ollama, async move {
            let response = client.post(&url).json(&body).send().await?;
            let parsed: ChatResponse = ensure_success(response)
                .await?
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
            Ok(into_parts(parsed))
        })
    }

    async fn status(&self) -> String {
        status_line(ProviderKind::Ollama, self.probe().await)
    }
}

// ==================== Wire types ====================

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<ChatToolCall>,
}

#[derive(Debug, Deserialize)]
struct ChatToolCall {
    function: ChatFunction,
}

#[derive(Debug, Deserialize)]
struct ChatFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagsModel>,
}

#[derive(Debug, Deserialize)]
struct TagsModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::default_tool_catalog;
    use kin_domain::{ToolError, ToolResult, ToolRound};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> OllamaAdapter {
        OllamaAdapter::new(LocalProviderConfig::new(server.uri(), "llama3.1")).unwrap()
    }

    #[tokio::test]
    async fn test_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1",
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [
                        { "function": { "name": "search_family", "arguments": { "query": "Nguyen" } } }
                    ]
                },
                "done": true
            })))
            .mount(&server)
            .await;

        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase1("hi", default_tool_catalog()))
            .collect_parts()
            .await;

        assert_eq!(
            parts,
            vec![ResponsePart::ToolCallRequest(vec![ToolCall::new(
                "call_1",
                "search_family",
                r#"{"query":"Nguyen"}"#
            )])]
        );

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["stream"], false);
        assert_eq!(body["model"], "llama3.1");
    }

    #[tokio::test]
    async fn test_phase2_sends_tool_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": { "role": "assistant", "content": "No access, sorry." },
                "done": true
            })))
            .mount(&server)
            .await;

        let round = ToolRound {
            preamble: "Checking.".to_string(),
            calls: vec![ToolCall::new("call_1", "get_member", "{bad")],
            results: vec![ToolResult::failure(
                "call_1",
                &ToolError::NotAuthenticated {
                    tool: "get_member".into(),
                },
            )],
        };
        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase2("hi", default_tool_catalog(), round))
            .collect_parts()
            .await;
        assert_eq!(parts, vec![ResponsePart::text("No access, sorry.")]);

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages[2]["content"], "Checking.");
        assert_eq!(messages[2]["tool_calls"][0]["function"]["arguments"], json!({}));
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(
            messages[3]["content"],
            r#"{"error":"not authenticated for tool 'get_member'"}"#
        );
    }

    #[tokio::test]
    async fn test_server_down_becomes_text() {
        let adapter =
            OllamaAdapter::new(LocalProviderConfig::new("http://127.0.0.1:9", "llama3.1")).unwrap();

        let parts = adapter
            .generate_stream(GenerateRequest::phase1("hi", default_tool_catalog()))
            .collect_parts()
            .await;

        assert_eq!(parts.len(), 1);
        let text = parts[0].as_text().unwrap();
        assert!(text.starts_with("Error: Ollama request failed: transport error:"), "{text}");
    }

    #[tokio::test]
    async fn test_status_lists_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{ "name": "llama3.1:latest" }, { "name": "mistral:7b" }]
            })))
            .mount(&server)
            .await;

        assert_eq!(
            adapter(&server).status().await,
            "ollama: reachable (2 models, using llama3.1)"
        );
    }
}
