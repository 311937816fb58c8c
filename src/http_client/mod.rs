use crate::client::ClientError;
use std::time::Duration;

#[cfg(test)]
mod tests;

pub mod reqwest;

/// Total time allowed for one request, from send to the last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// A response whose body has already been read to the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub body: Vec<u8>,
}

pub struct ClientConfig {
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Transport underneath [`ApiClient`](crate::client::ApiClient).
///
/// Implementations report connection failures and timeouts as
/// [`ClientError::Transport`] and body read failures as [`ClientError::Read`].
pub trait HttpClient {
    fn create(config: ClientConfig) -> Self
    where
        Self: Sized;

    fn execute(&self, request: Request) -> Result<Response, ClientError>;
}
