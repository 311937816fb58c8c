use crate::common::{client_for, silent_server, stalled_body_server, API_KEY};
use httpmock::MockServer;
use serde_json::{json, Value};
use std::thread;
use std::time::{Duration, Instant};
use verity::client::USER_AGENT;
use verity::http_client::Method;
use verity::{ApiClient, ClientError};

mod common;

#[test]
fn get_decodes_success_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/api/v1/health")
            .header("Authorization", &format!("Bearer {}", API_KEY))
            .header("User-Agent", USER_AGENT);
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data": {"x": 1}}"#);
    });

    let client = client_for(&server.url("/api/v1"));
    let result: Value = client.get("/health").unwrap();

    mock.assert();
    assert_eq!(result, json!({"data": {"x": 1}}));
}

#[test]
fn post_sends_json_body_with_content_type() {
    let body = json!({"procedure_codes": ["27447"], "payer": "medicare", "criteria_page": 1});

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/prior-auth/check")
            .header("Content-Type", "application/json")
            .json_body(body.clone());
        then.status(200).body(r#"{"success": true, "data": {}}"#);
    });

    let client = client_for(&server.base_url());
    let result: Value = client.post("/prior-auth/check", &body).unwrap();

    mock.assert();
    assert_eq!(result["success"], json!(true));
}

#[test]
fn api_error_envelope() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/codes/lookup");
        then.status(404).body(
            r#"{"success": false, "error": {"code": "NOT_FOUND", "message": "code not found"}}"#,
        );
    });

    let err = client_for(&server.base_url())
        .get::<Value>("/codes/lookup?code=00000")
        .unwrap_err();

    assert!(matches!(err, ClientError::Api(_)), "{:?}", err);
    assert_eq!(err.to_string(), "NOT_FOUND: code not found");
}

#[test]
fn plain_text_error_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/health");
        then.status(500).body("internal error");
    });

    let err = client_for(&server.base_url())
        .get::<Value>("/health")
        .unwrap_err();

    assert!(matches!(err, ClientError::Http { status: 500, .. }), "{:?}", err);
    assert_eq!(err.to_string(), "HTTP 500: internal error");
}

#[test]
fn malformed_success_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/jurisdictions");
        then.status(200).body("{\"data\": [");
    });

    let err = client_for(&server.base_url())
        .get::<Value>("/jurisdictions")
        .unwrap_err();

    assert!(matches!(err, ClientError::Decode(_)), "{:?}", err);
    assert!(err.to_string().starts_with("failed to parse response: "));
}

#[test]
fn send_ignores_success_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/health");
        then.status(200).body("not json at all");
    });

    client_for(&server.base_url())
        .send(Method::Get, "/health", None::<&()>)
        .unwrap();

    mock.assert();
}

#[test]
fn unanswered_request_times_out() {
    let base_url = silent_server(Duration::from_secs(10));
    let client = ApiClient::with_timeout(API_KEY, base_url, Duration::from_millis(300));

    let started = Instant::now();
    let err = client.get::<Value>("/health").unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)), "{:?}", err);
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "took {:?}",
        started.elapsed()
    );
}

#[test]
fn body_that_stalls_times_out() {
    let base_url = stalled_body_server(Duration::from_secs(10));
    let client = ApiClient::with_timeout(API_KEY, base_url, Duration::from_millis(300));

    let started = Instant::now();
    let err = client.get::<Value>("/health").unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)), "{:?}", err);
    assert!(err.to_string().starts_with("request failed: "));
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "took {:?}",
        started.elapsed()
    );
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let err = client_for("http://127.0.0.1:9")
        .get::<Value>("/health")
        .unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)), "{:?}", err);
    assert!(err.to_string().starts_with("request failed: "));
}

#[test]
fn client_is_shared_across_threads() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/health");
        then.status(200).body(r#"{"data": {"status": "healthy"}}"#);
    });

    let client = client_for(&server.base_url());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            thread::spawn(move || client.get::<Value>("/health").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap()["data"]["status"], json!("healthy"));
    }
    mock.assert_hits(4);
}
