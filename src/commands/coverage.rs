use std::io::{self, Write};

use serde_json::Value;

use super::{data_array, Command, RequestPath};
use crate::client::{ApiClient, ClientError};
use crate::output::truncate;

pub const DEFAULT_LIMIT: u32 = 50;
const MAX_TEXT_CHARS: usize = 200;

/// Full-text search over the coverage criteria of all policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageSearch {
    pub query: String,
    pub section: Option<String>,
    pub policy_type: Option<String>,
    pub jurisdiction: Option<String>,
    pub limit: u32,
}

impl CoverageSearch {
    pub fn path(&self) -> String {
        RequestPath::new("/coverage/criteria")
            .param("q", &self.query)
            .param_opt("section", self.section.as_deref())
            .param_opt("policy_type", self.policy_type.as_deref())
            .param_opt("jurisdiction", self.jurisdiction.as_deref())
            .param("limit", self.limit)
            .finish()
    }
}

impl Command for CoverageSearch {
    fn name(&self) -> &'static str {
        "coverage search"
    }

    fn execute(&self, client: &ApiClient) -> Result<Value, ClientError> {
        client.get(&self.path())
    }

    fn render_table(&self, response: &Value, out: &mut dyn Write) -> io::Result<()> {
        let blocks = match data_array(response) {
            Some(blocks) => blocks,
            None => return writeln!(out, "No criteria found"),
        };

        writeln!(out, "Found {} criteria blocks:\n", blocks.len())?;
        for block in blocks {
            if let Some(policy_id) = block.get("policy_id").and_then(Value::as_str) {
                write!(out, "Policy: {}", policy_id)?;
                if let Some(title) = block.get("policy_title").and_then(Value::as_str) {
                    write!(out, " - {}", title)?;
                }
                writeln!(out)?;
            }
            if let Some(section) = block.get("section").and_then(Value::as_str) {
                writeln!(out, "Section: {}", section)?;
            }
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                writeln!(out, "  {}", truncate(text, MAX_TEXT_CHARS))?;
            }
            writeln!(out, "---")?;
        }
        Ok(())
    }
}
