//! End-to-end turns: the real tool executor and REST backend against a
//! mock family service, with a scripted model in place of a vendor.

use async_trait::async_trait;
use kin_application::{
    GenerateRequest, ProviderAdapter, ProviderSelector, ResponseStream, RunTurnInput,
    RunTurnUseCase,
};
use kin_domain::{PROTOCOL_VIOLATION_NOTICE, ProviderKind, ResponsePart, ToolCall};
use kin_infrastructure::{BackendToolExecutor, RestFamilyBackend};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Replays one scripted response per round and records every request.
struct ScriptedModel {
    rounds: Mutex<VecDeque<Vec<ResponsePart>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    fn new(rounds: Vec<Vec<ResponsePart>>) -> Arc<Self> {
        Arc::new(Self {
            rounds: Mutex::new(rounds.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedModel {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn generate_stream(&self, request: GenerateRequest) -> ResponseStream {
        self.requests.lock().unwrap().push(request);
        let parts = self.rounds.lock().unwrap().pop_front().unwrap_or_default();
        ResponseStream::from_parts(parts)
    }

    async fn status(&self) -> String {
        "gemini: reachable (scripted)".to_string()
    }
}

fn use_case(model: Arc<ScriptedModel>, backend_url: &str) -> RunTurnUseCase {
    let selector = ProviderSelector::new("gemini").with_adapter(model);
    let backend = RestFamilyBackend::new(backend_url).unwrap();
    let executor = BackendToolExecutor::new(Arc::new(backend));
    RunTurnUseCase::new(Arc::new(selector), Arc::new(executor))
}

fn calls(list: &[(&str, &str, &str)]) -> ResponsePart {
    ResponsePart::ToolCallRequest(
        list.iter()
            .map(|(id, name, args)| ToolCall::new(*id, *name, *args))
            .collect(),
    )
}

fn payload_of(request: &GenerateRequest, call_id: &str) -> Value {
    let round = request.tool_round.as_ref().unwrap();
    let result = round.result_for(call_id).unwrap();
    serde_json::from_str(&result.payload).unwrap()
}

async fn mount_family_search(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/families/search"))
        .and(query_param("query", "Nguyen"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "f1", "name": "Nguyen" }])),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_then_answer() {
    let server = MockServer::start().await;
    mount_family_search(&server).await;
    let model = ScriptedModel::new(vec![
        vec![calls(&[("c1", "search_family", r#"{"query":"Nguyen"}"#)])],
        vec![ResponsePart::text("I found the Nguyen family (id f1).")],
    ]);

    let chunks = use_case(model.clone(), &server.uri())
        .run(RunTurnInput::new("Find family named Nguyen"))
        .collect()
        .await;

    assert_eq!(chunks, vec!["I found the Nguyen family (id f1).".to_string()]);
    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        payload_of(&requests[1], "c1"),
        json!([{ "id": "f1", "name": "Nguyen" }])
    );
}

#[tokio::test]
async fn test_unknown_provider_touches_nothing() {
    let server = MockServer::start().await;
    let model = ScriptedModel::new(vec![]);

    let chunks = use_case(model.clone(), &server.uri())
        .run(RunTurnInput::new("hello").with_provider("Claude"))
        .collect()
        .await;

    assert_eq!(chunks, vec!["Error: Invalid AI provider 'Claude'.".to_string()]);
    assert!(model.requests().is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_arguments_are_fed_back() {
    let server = MockServer::start().await;
    let model = ScriptedModel::new(vec![
        vec![calls(&[("c1", "search_family", "{bad json")])],
        vec![ResponsePart::text("Sorry, I could not search for that.")],
    ]);

    let answer = use_case(model.clone(), &server.uri())
        .run(RunTurnInput::new("Find family"))
        .collect_text()
        .await;

    assert_eq!(answer, "Sorry, I could not search for that.");
    assert_eq!(
        payload_of(&model.requests()[1], "c1"),
        json!({ "error": "invalid JSON arguments for tool 'search_family'" })
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_authenticated_tool_without_credential() {
    let server = MockServer::start().await;
    let model = ScriptedModel::new(vec![
        vec![calls(&[(
            "c1",
            "get_member",
            r#"{"member_id":"7f3c2a9e-1b4d-4c8e-9a6f-2d5b8e1c4a70"}"#,
        )])],
        vec![ResponsePart::text("Please sign in first.")],
    ]);

    let answer = use_case(model.clone(), &server.uri())
        .run(RunTurnInput::new("Who is member 7f3c?"))
        .collect_text()
        .await;

    assert_eq!(answer, "Please sign in first.");
    let payload = payload_of(&model.requests()[1], "c1");
    assert!(
        payload["error"]
            .as_str()
            .unwrap()
            .starts_with("not authenticated")
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_credential_reaches_backend_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/members/7f3c2a9e-1b4d-4c8e-9a6f-2d5b8e1c4a70"))
        .and(header("authorization", "Bearer family-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Lan" })))
        .expect(1)
        .mount(&server)
        .await;
    let model = ScriptedModel::new(vec![
        vec![calls(&[(
            "c1",
            "get_member",
            r#"{"member_id":"7f3c2a9e-1b4d-4c8e-9a6f-2d5b8e1c4a70"}"#,
        )])],
        vec![ResponsePart::text("That is Lan.")],
    ]);

    let input = RunTurnInput::new("Who is it?")
        .with_credential(kin_domain::Credential::new("family-token"));
    let answer = use_case(model.clone(), &server.uri())
        .run(input)
        .collect_text()
        .await;

    assert_eq!(answer, "That is Lan.");
    assert_eq!(payload_of(&model.requests()[1], "c1"), json!({ "name": "Lan" }));
}

#[tokio::test]
async fn test_batch_results_correlate_by_id() {
    let server = MockServer::start().await;
    mount_family_search(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/families/search"))
        .and(query_param("query", "Tran"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;
    let model = ScriptedModel::new(vec![
        vec![calls(&[
            ("a", "search_family", r#"{"query":"Nguyen"}"#),
            ("b", "search_family", r#"{"query":"Tran"}"#),
            ("c", "delete_family", "{}"),
        ])],
        vec![ResponsePart::text("Partial results.")],
    ]);

    use_case(model.clone(), &server.uri())
        .run(RunTurnInput::new("Nguyen and Tran"))
        .collect()
        .await;

    let phase2 = &model.requests()[1];
    let round = phase2.tool_round.as_ref().unwrap();
    let ids: Vec<&str> = round.results.iter().map(|r| r.tool_call_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(payload_of(phase2, "a")[0]["id"], "f1");
    assert_eq!(
        payload_of(phase2, "b"),
        json!({ "error": "backend returned status 500: database offline" })
    );
    assert_eq!(
        payload_of(phase2, "c"),
        json!({ "error": "unknown tool: 'delete_family'" })
    );
}

#[tokio::test]
async fn test_text_only_answer_makes_no_tool_or_second_call() {
    let server = MockServer::start().await;
    let model = ScriptedModel::new(vec![vec![
        ResponsePart::text("Hello! "),
        ResponsePart::text("How can I help?"),
    ]]);

    let answer = use_case(model.clone(), &server.uri())
        .run(RunTurnInput::new("hi"))
        .collect_text()
        .await;

    assert_eq!(answer, "Hello! How can I help?");
    assert_eq!(model.requests().len(), 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_round_tool_calls_are_not_executed() {
    let server = MockServer::start().await;
    mount_family_search(&server).await;
    let model = ScriptedModel::new(vec![
        vec![calls(&[("c1", "search_family", r#"{"query":"Nguyen"}"#)])],
        vec![
            ResponsePart::text("Found them."),
            calls(&[("c2", "search_family", r#"{"query":"Nguyen"}"#)]),
        ],
        vec![ResponsePart::text("never requested")],
    ]);

    let answer = use_case(model.clone(), &server.uri())
        .run(RunTurnInput::new("Find family named Nguyen"))
        .collect_text()
        .await;

    assert_eq!(model.requests().len(), 2);
    assert!(answer.starts_with("Found them."));
    assert!(answer.ends_with(PROTOCOL_VIOLATION_NOTICE));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_identical_turns_produce_identical_output() {
    let server = MockServer::start().await;
    mount_family_search(&server).await;
    let script = || {
        vec![
            vec![calls(&[("c1", "search_family", r#"{"query":"Nguyen"}"#)])],
            vec![ResponsePart::text("I found the Nguyen family (id f1).")],
        ]
    };
    let first_model = ScriptedModel::new(script());
    let second_model = ScriptedModel::new(script());

    let first = use_case(first_model.clone(), &server.uri())
        .run(RunTurnInput::new("Find family named Nguyen"))
        .collect()
        .await;
    let second = use_case(second_model.clone(), &server.uri())
        .run(RunTurnInput::new("Find family named Nguyen"))
        .collect()
        .await;

    assert_eq!(first, second);
    assert_eq!(
        payload_of(&first_model.requests()[1], "c1"),
        payload_of(&second_model.requests()[1], "c1")
    );
}
