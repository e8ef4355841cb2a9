//! Google Gemini adapter.
//!
//! Batched `POST {base}/models/{model}:generateContent` with
//! `functionDeclarations`. Gemini does not name its function calls, so ids
//! are synthesized per round (`call_1`, `call_2`, ...). The second round
//! replays the model's `functionCall` parts followed by one
//! `functionResponse` per result.

use super::{
    ProviderError, RemoteProviderConfig, SYSTEM_PROMPT, arguments_value, build_http_client,
    ensure_success, payload_object, spawn_batched, status_line, synthesized_call_id,
};
use crate::tools::JsonSchemaToolConverter;
use async_trait::async_trait;
use kin_application::ports::provider_adapter::{GenerateRequest, ProviderAdapter, ResponseStream};
use kin_domain::{ProviderKind, ResponsePart, ToolCall};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Sent as a header; reqwest errors echo the request URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiAdapter {
    config: RemoteProviderConfig,
    client: Client,
}

impl GeminiAdapter {
    pub fn new(config: RemoteProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client()?,
            config,
        })
    }

    fn build_request(&self, request: &GenerateRequest) -> GeminiRequest {
        let mut contents = vec![GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart::text(&request.prompt)],
        }];

        if let Some(round) = &request.tool_round {
            let preamble =
                (!round.preamble.is_empty()).then(|| GeminiPart::text(&round.preamble));
            contents.push(GeminiContent {
                role: "model".to_string(),
                parts: preamble
                    .into_iter()
                    .chain(round.calls.iter().map(|call| GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            name: call.function_name.clone(),
                            args: arguments_value(&call.function_args),
                        }),
                        ..GeminiPart::default()
                    }))
                    .collect(),
            });
            contents.push(GeminiContent {
                role: "user".to_string(),
                parts: round
                    .pairs()
                    .map(|(call, result)| GeminiPart {
                        function_response: Some(GeminiFunctionResponse {
                            name: call.function_name.clone(),
                            response: payload_object(result.payload_value()),
                        }),
                        ..GeminiPart::default()
                    })
                    .collect(),
            });
        }

        let converter = JsonSchemaToolConverter::without_formats();
        GeminiRequest {
            system_instruction: GeminiContent {
                role: String::new(),
                parts: vec![GeminiPart::text(SYSTEM_PROMPT)],
            },
            contents,
            tools: vec![GeminiTools {
                function_declarations: converter.catalog_schema(&request.catalog),
            }],
        }
    }

    async fn probe(&self) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}", self.config.base_url, self.config.model);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(format!("model {}", self.config.model))
    }
}

/// Flatten the first candidate into parts: text in order, then all calls.
fn into_parts(response: GeminiResponse) -> Result<Vec<ResponsePart>, ProviderError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {}", r))
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(ProviderError::InvalidResponse(reason));
    };

    let mut parts = Vec::new();
    let mut calls = Vec::new();
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(text) = part.text
            && !text.is_empty()
        {
            parts.push(ResponsePart::Text(text));
        }
        if let Some(call) = part.function_call {
            let args = if call.args.is_null() {
                "{}".to_string()
            } else {
                call.args.to_string()
            };
            calls.push(ToolCall::new(
                synthesized_call_id(calls.len()),
                call.name,
                args,
            ));
        }
    }
    if !calls.is_empty() {
        parts.push(ResponsePart::ToolCallRequest(calls));
    }
    Ok(parts)
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn generate_stream(&self, request: GenerateRequest) -> ResponseStream {
        let body = self.build_request(&request);
        let client = self.client.clone();
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let api_key = self.config.api_key.clone();
        debug!(
            model = %self.config.model,
            phase2 = request.is_phase2(),
            "Gemini generateContent"
        );

        spawn_batched(ProviderKind::Gemini, async move {
            let response = client
                .post(&url)
                .header(API_KEY_HEADER, api_key)
                .json(&body)
                .send()
                .await?;
            let response = ensure_success(response).await?;
            let parsed: GeminiResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
            into_parts(parsed)
        })
    }

    async fn status(&self) -> String {
        status_line(ProviderKind::Gemini, self.probe().await)
    }
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    tools: Vec<GeminiTools>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTools {
    function_declarations: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::default_tool_catalog;
    use kin_domain::{ToolResult, ToolRound};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> GeminiAdapter {
        GeminiAdapter::new(RemoteProviderConfig::new(
            "g-key",
            server.uri(),
            "gemini-test",
        ))
        .unwrap()
    }

    fn candidate(parts: Value) -> Value {
        json!({ "candidates": [{ "content": { "role": "model", "parts": parts } }] })
    }

    #[tokio::test]
    async fn test_text_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate(json!([{ "text": "Hello there." }]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase1("hi", default_tool_catalog()))
            .collect_parts()
            .await;

        assert_eq!(parts, vec![ResponsePart::text("Hello there.")]);
    }

    #[tokio::test]
    async fn test_function_calls_get_synthesized_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(json!([
                { "text": "Looking." },
                { "functionCall": { "name": "search_family", "args": { "query": "Nguyen" } } },
                { "functionCall": { "name": "search_events" } }
            ]))))
            .mount(&server)
            .await;

        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase1("hi", default_tool_catalog()))
            .collect_parts()
            .await;

        assert_eq!(
            parts,
            vec![
                ResponsePart::text("Looking."),
                ResponsePart::ToolCallRequest(vec![
                    ToolCall::new("call_1", "search_family", r#"{"query":"Nguyen"}"#),
                    ToolCall::new("call_2", "search_events", "{}"),
                ]),
            ]
        );
    }

    #[tokio::test]
    async fn test_phase2_sends_function_responses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate(json!([{ "text": "Found them." }]))),
            )
            .mount(&server)
            .await;

        let call = ToolCall::new("call_1", "search_family", r#"{"query":"Nguyen"}"#);
        let round = ToolRound {
            preamble: String::new(),
            results: vec![ToolResult::success("call_1", &json!([{ "id": "f1" }]))],
            calls: vec![call],
        };
        adapter(&server)
            .generate_stream(GenerateRequest::phase2("hi", default_tool_catalog(), round))
            .collect_parts()
            .await;

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(
            contents[1]["parts"][0]["functionCall"],
            json!({ "name": "search_family", "args": { "query": "Nguyen" } })
        );
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"],
            json!({ "name": "search_family", "response": { "result": [{ "id": "f1" }] } })
        );
        assert!(
            body["tools"][0]["functionDeclarations"]
                .as_array()
                .is_some_and(|d| d.len() == 6)
        );
    }

    #[test]
    fn test_phase2_replays_preamble_before_calls() {
        let adapter = GeminiAdapter::new(RemoteProviderConfig::new(
            "g-key",
            "http://localhost",
            "gemini-test",
        ))
        .unwrap();
        let round = ToolRound {
            preamble: "Looking.".to_string(),
            calls: vec![ToolCall::new("call_1", "search_family", r#"{"query":"N"}"#)],
            results: vec![ToolResult::success("call_1", &json!([]))],
        };

        let request = GenerateRequest::phase2("hi", default_tool_catalog(), round);
        let body = serde_json::to_value(adapter.build_request(&request)).unwrap();

        let model_parts = &body["contents"][1]["parts"];
        assert_eq!(model_parts[0]["text"], "Looking.");
        assert_eq!(model_parts[1]["functionCall"]["name"], "search_family");
    }

    #[tokio::test]
    async fn test_http_error_becomes_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase1("hi", default_tool_catalog()))
            .collect_parts()
            .await;

        assert_eq!(
            parts,
            vec![ResponsePart::text(
                "Error: Gemini request failed: HTTP 400: API key not valid"
            )]
        );
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let parts = adapter(&server)
            .generate_stream(GenerateRequest::phase1("hi", default_tool_catalog()))
            .collect_parts()
            .await;

        assert_eq!(
            parts,
            vec![ResponsePart::text(
                "Error: Gemini request failed: invalid response: prompt blocked: SAFETY"
            )]
        );
    }

    #[tokio::test]
    async fn test_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models/gemini-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "x" })))
            .mount(&server)
            .await;

        assert_eq!(
            adapter(&server).status().await,
            "gemini: reachable (model gemini-test)"
        );
    }
}
