//! Integration tests for the state holders
//!
//! Drives `SessionsState`, `KnowledgeBaseState` and `GlobalLoading` over a
//! real pipeline backed by `MockTransport`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use platform_client_core::{Method, PreparedBody, TransportError, Value};
use platform_client_runtime::HttpClient;
use platform_client_services::PlatformServices;
use platform_client_services::doclib_manage::KnowledgeBaseUpdateRequest;
use platform_client_state::{CreateSession, GlobalLoading, KnowledgeBaseState, SendMessage, SessionsState};
use platform_client_testing::{MockResponse, MockTransport, SequentialIdGenerator, test_clock};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

struct Fixture {
    transport: Arc<MockTransport>,
    loading: Arc<GlobalLoading>,
    services: PlatformServices,
}

fn fixture() -> Fixture {
    let transport = Arc::new(MockTransport::new());
    let loading = Arc::new(GlobalLoading::with_clock(Arc::new(test_clock())));
    let client = HttpClient::builder()
        .base_url("https://api.example/")
        .transport(transport.clone())
        .observer(loading.clone())
        .clock(Arc::new(test_clock()))
        .id_generator(Arc::new(SequentialIdGenerator::new()))
        .build();
    Fixture {
        transport,
        loading,
        services: PlatformServices::new(client),
    }
}

impl Fixture {
    fn sessions(&self) -> SessionsState {
        SessionsState::new(self.services.llm_apps.clone())
    }

    fn knowledge_bases(&self) -> KnowledgeBaseState {
        KnowledgeBaseState::new(self.services.doclib_manage.clone())
    }

    fn calls(&self) -> Vec<(Method, String)> {
        self.transport
            .requests()
            .into_iter()
            .map(|request| (request.method, request.url))
            .collect()
    }

    fn last_body(&self) -> Value {
        let request = self.transport.last_request().unwrap();
        let text = request.body.as_ref().and_then(PreparedBody::as_text).unwrap();
        serde_json::from_str(text).unwrap()
    }
}

fn ok(data: &Value) -> MockResponse {
    MockResponse::json(200, &json!({ "data": data }))
}

fn url(path: &str) -> String {
    format!("https://api.example{path}")
}

const SESSIONS: &str = "/v1/llm/chat/u1/sessions";

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_load_sessions_requires_user_id() {
    let f = fixture();
    let sessions = f.sessions();

    sessions.load_sessions("   ").await;

    assert_eq!(sessions.state(|s| s.session_error.clone()).await, "user id is required");
    assert_eq!(f.transport.request_count(), 0);
}

#[tokio::test]
async fn test_load_sessions_clears_vanished_selection() {
    let f = fixture();
    let sessions = f.sessions();
    f.transport.enqueue(
        Method::Get,
        "/v1/llm/chat/sessions/s2/messages",
        ok(&json!({"messages": [{"role": "user", "content": "hi"}]})),
    );
    f.transport.enqueue(
        Method::Get,
        SESSIONS,
        ok(&json!({"conversations": [{"session_id": "s1"}, {"session_id": "s2"}]})),
    );
    f.transport
        .enqueue(Method::Get, SESSIONS, ok(&json!({"conversations": [{"session_id": "s1"}]})));

    sessions.load_sessions(" u1 ").await;
    sessions.select_session("s2").await;
    let state = sessions.snapshot().await;
    assert_eq!(state.sessions.len(), 2);
    assert_eq!(state.selected_session().unwrap().session_id, "s2");
    assert_eq!(state.messages.len(), 1);

    sessions.load_sessions("u1").await;
    let state = sessions.snapshot().await;
    assert_eq!(state.sessions.len(), 1);
    assert!(state.selected_session_id.is_none());
    assert!(state.messages.is_empty());
    assert!(!state.session_loading);
}

#[tokio::test]
async fn test_failed_reload_keeps_list() {
    let f = fixture();
    let sessions = f.sessions();
    f.transport
        .enqueue(Method::Get, SESSIONS, ok(&json!({"conversations": [{"session_id": "s1"}]})));
    f.transport.enqueue(
        Method::Get,
        SESSIONS,
        MockResponse::json(503, &json!({"message": "llm service unavailable"})),
    );

    sessions.load_sessions("u1").await;
    sessions.load_sessions("u1").await;

    let state = sessions.snapshot().await;
    assert_eq!(state.sessions.len(), 1);
    assert_eq!(state.session_error, "llm service unavailable");
    assert!(!state.session_loading);
}

#[tokio::test]
async fn test_create_session_reloads_and_selects() {
    let f = fixture();
    let sessions = f.sessions();
    f.transport
        .enqueue(Method::Post, "/v1/llm/chat/sessions", ok(&json!({"session_id": "s9"})));
    f.transport
        .enqueue(Method::Get, SESSIONS, ok(&json!({"conversations": [{"session_id": "s9"}]})));
    f.transport
        .enqueue(Method::Get, "/v1/llm/chat/sessions/s9/messages", ok(&json!({"messages": []})));

    sessions
        .create_session(
            "u1",
            CreateSession {
                title: Some("  Plans ".to_string()),
                system_prompt: Some(" be brief ".to_string()),
            },
        )
        .await;

    assert_eq!(
        f.calls(),
        [
            (Method::Post, url("/v1/llm/chat/sessions")),
            (Method::Get, url(SESSIONS)),
            (Method::Get, url("/v1/llm/chat/sessions/s9/messages")),
        ]
    );
    let body: Value = serde_json::from_str(
        f.transport.requests()[0]
            .body
            .as_ref()
            .and_then(PreparedBody::as_text)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(
        body,
        json!({
            "conversation_title": "Plans",
            "system_prompt": [{"role": "system", "content": "be brief"}]
        })
    );
    let state = sessions.snapshot().await;
    assert_eq!(state.selected_session_id.as_deref(), Some("s9"));
    assert!(!state.creating_session);
}

#[tokio::test]
async fn test_create_session_without_id_does_not_reload() {
    let f = fixture();
    let sessions = f.sessions();
    f.transport
        .enqueue(Method::Post, "/v1/llm/chat/sessions", ok(&json!({})));

    sessions.create_session("u1", CreateSession::default()).await;

    assert_eq!(f.transport.request_count(), 1);
    assert_eq!(f.last_body(), json!({}));
    assert!(sessions.state(|s| s.selected_session_id.is_none()).await);
}

#[tokio::test]
async fn test_delete_and_rename_session() {
    let f = fixture();
    let sessions = f.sessions();
    f.transport.enqueue(
        Method::Get,
        SESSIONS,
        ok(&json!({"conversations": [
            {"session_id": "s1", "conversation_title": "old"},
            {"session_id": "s2"}
        ]})),
    );
    f.transport
        .enqueue(Method::Get, "/v1/llm/chat/sessions/s2/messages", ok(&json!({"messages": []})));
    f.transport
        .enqueue(Method::Put, "/v1/llm/chat/sessions/s1", MockResponse::empty(204));
    f.transport
        .enqueue(Method::Delete, "/v1/llm/chat/sessions/s2", MockResponse::empty(204));

    sessions.load_sessions("u1").await;
    sessions.select_session("s2").await;

    sessions.rename_session("s1", "  new ").await;
    assert_eq!(f.last_body(), json!({"conversation_title": "new"}));

    sessions.rename_session("s1", "   ").await;
    assert_eq!(f.transport.request_count(), 3);

    sessions.delete_session("s2").await;

    let state = sessions.snapshot().await;
    assert_eq!(state.sessions.len(), 1);
    assert_eq!(state.sessions[0].conversation_title.as_deref(), Some("new"));
    assert!(state.selected_session_id.is_none());
    assert!(state.session_error.is_empty());
}

#[tokio::test]
async fn test_send_message_validation() {
    let f = fixture();
    let sessions = f.sessions();

    sessions
        .send_message(SendMessage {
            content: "hi".to_string(),
            ..SendMessage::default()
        })
        .await;
    assert_eq!(sessions.state(|s| s.chat_error.clone()).await, "select a session first");

    sessions
        .send_message(SendMessage {
            session_id: "s1".to_string(),
            content: "  ".to_string(),
            ..SendMessage::default()
        })
        .await;
    assert_eq!(sessions.state(|s| s.chat_error.clone()).await, "message content is empty");
    assert_eq!(f.transport.request_count(), 0);
}

#[tokio::test]
async fn test_send_message_reloads_messages() {
    let f = fixture();
    let sessions = f.sessions();
    f.transport
        .enqueue(Method::Post, "/v1/llm/chat-conversations", ok(&json!({"answer": "hello"})));
    f.transport.enqueue(
        Method::Get,
        "/v1/llm/chat/sessions/s1/messages",
        ok(&json!({"messages": [
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "hello"}
        ]})),
    );

    sessions
        .send_message(SendMessage {
            session_id: "s1".to_string(),
            content: " hi ".to_string(),
            know_ids: Vec::new(),
        })
        .await;

    let body: Value = serde_json::from_str(
        f.transport.requests()[0]
            .body
            .as_ref()
            .and_then(PreparedBody::as_text)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(body, json!({"session_id": "s1", "content": "hi", "stream": false}));

    let state = sessions.snapshot().await;
    assert_eq!(state.messages.len(), 2);
    assert!(!state.chat_sending);
    assert!(state.chat_error.is_empty());
}

#[tokio::test]
async fn test_send_message_failure() {
    let f = fixture();
    let sessions = f.sessions();
    f.transport.enqueue(
        Method::Post,
        "/v1/llm/chat-conversations",
        MockResponse::error(TransportError::Connect("connection refused".to_string())),
    );

    sessions
        .send_message(SendMessage {
            session_id: "s1".to_string(),
            content: "hi".to_string(),
            know_ids: vec!["kb1".to_string()],
        })
        .await;

    let state = sessions.snapshot().await;
    assert!(!state.chat_error.is_empty());
    assert!(!state.chat_sending);
    assert_eq!(f.transport.request_count(), 1);
}

// ============================================================================
// Knowledge bases
// ============================================================================

#[tokio::test]
async fn test_load_knowledge_bases_accepts_paged_envelope() {
    let f = fixture();
    let kbs = f.knowledge_bases();
    f.transport.enqueue(
        Method::Get,
        "/v1/knowledge-bases",
        ok(&json!({"data": [{"id": "kb1", "name": "Docs"}, {"id": "kb2"}], "total": 2})),
    );

    kbs.load_knowledge_bases().await;

    let state = kbs.snapshot().await;
    assert_eq!(state.knowledge_bases.len(), 2);
    let labels: Vec<_> = state.options().into_iter().map(|o| o.label).collect();
    assert_eq!(labels, ["Docs", "kb2"]);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_knowledge_base_mutations() {
    let f = fixture();
    let kbs = f.knowledge_bases();
    f.transport
        .enqueue(Method::Get, "/v1/knowledge-bases", ok(&json!([{"id": "kb1", "name": "Docs"}])));
    f.transport.enqueue(
        Method::Post,
        "/v1/knowledge-bases",
        ok(&json!({"id": "kb2", "name": "Manuals"})),
    );
    f.transport.enqueue(
        Method::Put,
        "/v1/knowledge-bases/kb1",
        ok(&json!({"id": "kb1", "name": "Docs v2"})),
    );
    f.transport
        .enqueue(Method::Delete, "/v1/knowledge-bases/kb2", MockResponse::empty(204));

    kbs.load_knowledge_bases().await;

    kbs.create_knowledge_base("  ", None).await;
    assert_eq!(kbs.state(|s| s.error.clone()).await, "knowledge base name is required");

    kbs.create_knowledge_base(" Manuals ", Some("  ")).await;
    assert_eq!(f.last_body(), json!({"name": "Manuals"}));
    let ids = kbs
        .state(|s| s.knowledge_bases.iter().map(|kb| kb.id.clone().unwrap()).collect::<Vec<_>>())
        .await;
    assert_eq!(ids, ["kb2", "kb1"]);

    let update = KnowledgeBaseUpdateRequest {
        name: Some("Docs v2".to_string()),
        description: None,
    };
    kbs.update_knowledge_base("kb1", &update).await;
    kbs.delete_knowledge_base("kb2").await;

    let state = kbs.snapshot().await;
    assert_eq!(state.knowledge_bases.len(), 1);
    assert_eq!(state.knowledge_bases[0].name.as_deref(), Some("Docs v2"));
    assert!(state.error.is_empty());
    assert!(!state.saving);
}

#[tokio::test]
async fn test_failed_create_leaves_list() {
    let f = fixture();
    let kbs = f.knowledge_bases();
    f.transport.enqueue(
        Method::Post,
        "/v1/knowledge-bases",
        MockResponse::json(409, &json!({"message": "name already taken"})),
    );

    kbs.create_knowledge_base("Docs", None).await;

    let state = kbs.snapshot().await;
    assert!(state.knowledge_bases.is_empty());
    assert_eq!(state.error, "name already taken");
}

#[tokio::test]
async fn test_files_follow_selection() {
    let f = fixture();
    let kbs = f.knowledge_bases();
    f.transport
        .enqueue(Method::Get, "/v1/knowledge-bases", ok(&json!([{"id": "kb1"}])));
    f.transport.enqueue(
        Method::Get,
        "/v1/knowledge-bases/kb1/files",
        ok(&json!([{"file_id": "f1", "status": "ready"}])),
    );
    f.transport.enqueue(
        Method::Post,
        "/v1/knowledge-bases/kb1/files",
        ok(&json!({"file_id": "f1", "status": "reindexing"})),
    );
    f.transport.enqueue(
        Method::Post,
        "/v1/knowledge-bases/kb1/files",
        ok(&json!({"file_id": "f2", "status": "indexing"})),
    );
    f.transport
        .enqueue(Method::Delete, "/v1/knowledge-bases/kb1/files/f1", MockResponse::empty(204));
    f.transport
        .enqueue(Method::Delete, "/v1/knowledge-bases/kb1", MockResponse::empty(204));

    kbs.load_knowledge_bases().await;
    kbs.select_knowledge_base(Some("kb1")).await;
    assert_eq!(kbs.state(|s| s.files.len()).await, 1);

    // Same file id replaces in place; a new one is prepended.
    kbs.add_file("kb1", " f1 ").await;
    kbs.add_file("kb1", "f2").await;
    let files = kbs
        .state(|s| {
            s.files
                .iter()
                .map(|file| (file.file_id.clone().unwrap(), file.status.clone().unwrap()))
                .collect::<Vec<_>>()
        })
        .await;
    assert_eq!(
        files,
        [
            ("f2".to_string(), "indexing".to_string()),
            ("f1".to_string(), "reindexing".to_string()),
        ]
    );

    kbs.delete_file("kb1", "f1").await;
    assert_eq!(kbs.state(|s| s.files.len()).await, 1);

    kbs.delete_knowledge_base("kb1").await;
    let state = kbs.snapshot().await;
    assert!(state.selected_id.is_none());
    assert!(state.files.is_empty());
}

#[tokio::test]
async fn test_add_file_validation_and_deselect() {
    let f = fixture();
    let kbs = f.knowledge_bases();

    kbs.add_file("kb1", "  ").await;
    assert_eq!(
        kbs.state(|s| s.file_error.clone()).await,
        "select a knowledge base and enter a file id"
    );

    kbs.select_knowledge_base(None).await;
    assert!(kbs.state(|s| s.selected_id.is_none() && s.files.is_empty()).await);
    assert_eq!(f.transport.request_count(), 0);
}

#[tokio::test]
async fn test_failed_file_reload_clears_files() {
    let f = fixture();
    let kbs = f.knowledge_bases();
    f.transport
        .enqueue(Method::Get, "/v1/knowledge-bases/kb1/files", ok(&json!([{"file_id": "f1"}])));
    f.transport.enqueue(
        Method::Get,
        "/v1/knowledge-bases/kb1/files",
        MockResponse::json(500, &json!({"message": "index offline"})),
    );

    kbs.load_files("kb1").await;
    assert_eq!(kbs.state(|s| s.files.len()).await, 1);

    kbs.load_files("kb1").await;
    let state = kbs.snapshot().await;
    assert!(state.files.is_empty());
    assert_eq!(state.file_error, "index offline");
}

// ============================================================================
// Global loading
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_global_loading_tracks_flagged_calls() {
    let f = fixture();
    let kbs = f.knowledge_bases();
    let sessions = f.sessions();
    f.transport.enqueue(
        Method::Get,
        "/v1/knowledge-bases",
        ok(&json!([])).with_delay(Duration::from_millis(100)),
    );
    f.transport
        .enqueue(Method::Get, SESSIONS, ok(&json!({"conversations": []})));

    let mid_flight = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        (f.loading.pending(), kbs.state(|s| s.loading).await)
    };
    let ((), (pending, loading_flag)) = tokio::join!(kbs.load_knowledge_bases(), mid_flight);

    assert_eq!(pending, 1);
    assert!(loading_flag);
    assert!(!f.loading.is_loading());
    assert!(f.loading.last_duration().is_some());

    // Session calls do not ask for the indicator.
    sessions.load_sessions("u1").await;
    assert_eq!(f.loading.pending(), 0);
}

#[tokio::test]
async fn test_global_loading_returns_to_zero_after_failure() {
    let f = fixture();
    let kbs = f.knowledge_bases();
    f.transport.enqueue(
        Method::Get,
        "/v1/knowledge-bases",
        MockResponse::error(TransportError::Connect("connection refused".to_string())),
    );

    kbs.load_knowledge_bases().await;

    assert!(!f.loading.is_loading());
    assert!(!kbs.state(|s| s.error.is_empty()).await);
}

#[tokio::test(start_paused = true)]
async fn test_global_loading_returns_to_zero_when_call_is_dropped() {
    let f = fixture();
    let kbs = f.knowledge_bases();
    f.transport
        .enqueue(Method::Get, "/v1/knowledge-bases", MockResponse::hang());

    let abandoned = tokio::time::timeout(Duration::from_secs(1), kbs.load_knowledge_bases()).await;

    assert!(abandoned.is_err());
    assert_eq!(f.loading.pending(), 0);
    assert!(!f.loading.is_loading());
}
