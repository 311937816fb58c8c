use crate::client::ClientError;
use crate::http_client::{ClientConfig, HttpClient, Method, Request, Response};
use reqwest::blocking::{Client, RequestBuilder};

/// Blocking transport backed by a pooled `reqwest` client. Cloning shares the pool.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::create(ClientConfig::default())
    }
}

impl HttpClient for ReqwestHttpClient {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, like `reqwest::blocking::Client::new`.
    fn create(config: ClientConfig) -> ReqwestHttpClient
    where
        Self: Sized,
    {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to initialize the HTTP client");

        ReqwestHttpClient { client }
    }

    fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let Request {
            method,
            url,
            headers,
            body,
        } = request;
        let mut request_builder = self.client.request(method.into(), url.as_str());
        request_builder = set_headers(&headers, request_builder);
        if let Some(body) = body {
            request_builder = request_builder.body(body);
        }

        let response = request_builder
            .send()
            .map_err(|err| ClientError::Transport(Box::new(err)))?;
        let status_code = response.status().as_u16();
        // The timeout covers the body too; running out mid-body is still a timeout.
        let body = response.bytes().map_err(|err| {
            if err.is_timeout() {
                ClientError::Transport(Box::new(err))
            } else {
                ClientError::Read(Box::new(err))
            }
        })?;

        Ok(Response {
            status_code,
            body: body.to_vec(),
        })
    }
}

fn set_headers(
    headers: &[(String, String)],
    mut request_builder: RequestBuilder,
) -> RequestBuilder {
    for (key, value) in headers {
        request_builder = request_builder.header(key, value);
    }
    request_builder
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}
