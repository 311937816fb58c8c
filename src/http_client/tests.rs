use httpmock::MockServer;

use crate::client::ClientError;
use crate::http_client::reqwest::ReqwestHttpClient;
use crate::http_client::{ClientConfig, HttpClient, Method, Request, DEFAULT_TIMEOUT};
use std::time::Duration;

#[test]
fn execute() {
    let body = "{\"result\": \"content\"}";

    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/defaults")
            .body(body)
            .header("X-Custom-Header", "test_validate_verify")
            .header("Content-Type", "application/json");
        then.status(201).body("created");
    });

    let request = Request {
        method: Method::Post,
        url: server.url("/defaults"),
        headers: vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                "X-Custom-Header".to_string(),
                "test_validate_verify".to_string(),
            ),
        ],
        body: Some(body.as_bytes().to_vec()),
    };
    let client = ReqwestHttpClient::default();
    let res = client.execute(request).unwrap();

    mock.assert();
    assert_eq!(res.status_code, 201);
    assert_eq!(res.body, b"created".to_vec());
}

#[test]
fn connection_refused_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let request = Request {
        method: Method::Get,
        url: format!("http://127.0.0.1:{}/health", port),
        headers: vec![],
        body: None,
    };
    let err = ReqwestHttpClient::default().execute(request).unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)), "{:?}", err);
}

#[test]
fn malformed_url_is_a_transport_error() {
    let request = Request {
        method: Method::Get,
        url: "not a url/health".to_string(),
        headers: vec![],
        body: None,
    };
    let err = ReqwestHttpClient::default().execute(request).unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)), "{:?}", err);
}

#[test]
fn default_timeout_is_thirty_seconds() {
    assert_eq!(ClientConfig::default().timeout, Duration::from_secs(30));
    assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
}
