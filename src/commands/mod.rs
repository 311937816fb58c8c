use std::io::{self, Write};

use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use crate::client::{ApiClient, ClientError};
use crate::output::print::Outputter;
use crate::Result;


pub mod check;
pub mod coverage;
pub mod health;
pub mod jurisdictions;
pub mod policies;
pub mod prior_auth;
pub mod spending;

pub use check::Check;
pub use coverage::CoverageSearch;
pub use health::Health;
pub use jurisdictions::Jurisdictions;
pub use policies::{PoliciesList, PolicyGet};
pub use prior_auth::{PriorAuth, PriorAuthRequest};
pub use spending::Spending;

/// One CLI command backed by a single API endpoint.
pub trait Command {
    fn name(&self) -> &'static str;

    fn execute(&self, client: &ApiClient) -> std::result::Result<Value, ClientError>;

    /// Human-readable rendering of a successful response.
    fn render_table(&self, response: &Value, out: &mut dyn Write) -> io::Result<()>;
}

pub fn run(
    command: &dyn Command,
    client: &ApiClient,
    outputter: &mut dyn Outputter,
) -> Result<()> {
    debug!(
        command = command.name(),
        base_url = client.base_url(),
        "sending request"
    );
    let response = command.execute(client).map_err(|err| {
        debug!(command = command.name(), error = %err, "request failed");
        err
    })?;
    debug!(command = command.name(), "received response");

    outputter.response(command, &response)
}

/// Path plus URL-encoded query string, with parameters kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    path: String,
    params: Vec<(&'static str, String)>,
}

impl RequestPath {
    pub fn new(path: impl Into<String>) -> Self {
        RequestPath {
            path: path.into(),
            params: vec![],
        }
    }

    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    pub fn param_opt(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => self.param(key, value),
            _ => self,
        }
    }

    /// Adds `key=a,b,c` unless `values` is empty.
    pub fn param_list(self, key: &'static str, values: &[String]) -> Self {
        if values.is_empty() {
            self
        } else {
            self.param(key, values.join(","))
        }
    }

    pub fn finish(self) -> String {
        if self.params.is_empty() {
            return self.path;
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params)
            .finish();
        format!("{}?{}", self.path, query)
    }
}

/// Percent-encodes one path segment. Spaces become `%20`, not `+`.
pub fn path_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .map(|chunk| if chunk == "+" { "%20" } else { chunk })
        .collect()
}

fn data_object(response: &Value) -> Option<&Value> {
    response.get("data").filter(|data| data.is_object())
}

fn data_array(response: &Value) -> Option<&Vec<Value>> {
    response
        .get("data")
        .and_then(Value::as_array)
        .filter(|data| !data.is_empty())
}
