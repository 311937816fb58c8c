//! Authenticated JSON requests against the Verity API.
//!
//! Every call runs the same pipeline: serialize the body, send it with the
//! bearer token, classify the response by status code and decode the payload.
//! Failures are returned to the caller as they happen; there are no retries.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::http_client::reqwest::ReqwestHttpClient;
use crate::http_client::{ClientConfig, HttpClient, Method, Request};


pub const USER_AGENT: &str = concat!("verity-cli/", env!("CARGO_PKG_VERSION"));

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to marshal request body: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("request failed: {0}")]
    Transport(#[source] BoxError),
    #[error("failed to read response: {0}")]
    Read(#[source] BoxError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Structured error reported by the service in a non-200 response.
#[derive(Debug, Clone, PartialEq, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub details: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    success: bool,
    error: ApiError,
}

#[derive(Clone)]
pub struct ApiClient<H = ReqwestHttpClient> {
    api_key: String,
    base_url: String,
    http: H,
}

impl ApiClient<ReqwestHttpClient> {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_http_client(api_key, base_url, ReqwestHttpClient::default())
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http = ReqwestHttpClient::create(ClientConfig::new(timeout));
        Self::with_http_client(api_key, base_url, http)
    }
}

impl<H: HttpClient> ApiClient<H> {
    pub fn with_http_client(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        http: H,
    ) -> Self {
        ApiClient {
            api_key: api_key.into(),
            base_url: base_url.into(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(Method::Get, path, None::<&()>)
    }

    pub fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::Post, path, Some(body))
    }

    pub fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(method, path, body)?;
        serde_json::from_slice(&body).map_err(ClientError::Decode)
    }

    /// Runs the request up to the status check and hands back the raw body
    /// of the 200 response. Callers with no use for the payload drop it.
    pub fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ClientError::Serialization)?;

        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.api_key),
            ),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let request = Request {
            method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        };
        let response = self.http.execute(request)?;

        if response.status_code != 200 {
            return Err(classify_error(response.status_code, &response.body));
        }
        Ok(response.body)
    }
}

/// A non-200 response is an [`ApiError`] only when the body is the error
/// envelope with `success` false; anything else keeps the raw text. Missing
/// `code` or `message` fields are left empty.
fn classify_error(status: u16, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.success => ClientError::Api(envelope.error),
        _ => ClientError::Http {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        },
    }
}
