//! Integration tests for the reqwest transport
//!
//! Runs the full pipeline against a local `wiremock` server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use platform_client_core::body::MultipartForm;
use platform_client_core::{HttpErrorKind, RequestBody, RequestDescriptor, StaticToken, Value};
use platform_client_runtime::HttpClient;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::builder()
        .base_url(format!("{}/", server.uri()))
        .token_provider(Arc::new(StaticToken::new(Some("t0k3n".to_string()))))
        .build()
}

#[tokio::test]
async fn test_get_with_query_and_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks"))
        .and(query_param("status", "done"))
        .and(header("authorization", "Bearer t0k3n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "t1"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client_for(&server)
        .request_value(
            RequestDescriptor::get("/v1/tasks")
                .with_query(&json!({"status": "done"}))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(tasks, json!([{"id": "t1"}]));
}

#[tokio::test]
async fn test_request_id_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/captchas"))
        .and(header("x-request-id", "trace-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "c1"}})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .request_value(RequestDescriptor::get("/v1/captchas").with_request_id("trace-42"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_post_json_body() {
    let server = MockServer::start().await;
    let body = json!({"name": "Docs", "description": "product manuals"});
    Mock::given(method("POST"))
        .and(path("/v1/knowledge-bases"))
        .and(header("content-type", "application/json"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "kb-1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let created = client_for(&server)
        .request_value(RequestDescriptor::post("/v1/knowledge-bases").with_json(&body).unwrap())
        .await
        .unwrap();

    assert_eq!(created, json!({"id": "kb-1"}));
}

#[tokio::test]
async fn test_url_encoded_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/form"))
        .and(body_string("a=1&b=two+words"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let body = RequestBody::UrlEncoded(vec![
        ("a".to_string(), "1".to_string()),
        ("b".to_string(), "two words".to_string()),
    ]);
    let value = client_for(&server)
        .request_value(RequestDescriptor::post("/form").with_body(body))
        .await
        .unwrap();

    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn test_multipart_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/knowledge-bases/kb-1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"file_id": "f-1"}})))
        .mount(&server)
        .await;

    let form = MultipartForm::new()
        .text("purpose", "retrieval")
        .file("file", "notes.txt", Some("text/plain".to_string()), b"hello".to_vec());
    client_for(&server)
        .request_value(RequestDescriptor::post("/v1/knowledge-bases/kb-1/files").with_body(form))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let request = &received[0];
    let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("notes.txt"));
    assert!(body.contains("retrieval"));
    assert!(body.contains("hello"));
}

#[tokio::test]
async fn test_status_error_keeps_body_and_reason() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/tasks/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "task not found"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .request_value(RequestDescriptor::delete("/v1/tasks/missing"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, HttpErrorKind::Status);
    assert_eq!(err.status, Some(404));
    assert_eq!(err.to_string(), "Not Found");
    assert_eq!(err.body_message().as_deref(), Some("task not found"));
}

#[tokio::test]
async fn test_plain_text_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let value = client_for(&server)
        .request_value(RequestDescriptor::get("/health"))
        .await
        .unwrap();
    assert_eq!(value, json!("ok"));
}

#[tokio::test]
async fn test_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/fine_tuning/jobs/job-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let value = client_for(&server)
        .request_value(RequestDescriptor::delete("/v1/fine_tuning/jobs/job-1"))
        .await
        .unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .request_value(RequestDescriptor::get("/slow").with_timeout(Duration::from_millis(100)))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let client = HttpClient::builder().base_url("http://127.0.0.1:1/").build();

    let err = client
        .request_value(RequestDescriptor::get("/v1/tasks"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, HttpErrorKind::Network);
    assert!(err.status.is_none());
}
