use std::io::{self, Write};

use serde_json::Value;

use super::{data_array, data_object, path_segment, Command, RequestPath};
use crate::client::{ApiClient, ClientError};
use crate::output::{field, non_empty};

pub const PAGE_SIZE: u32 = 50;
pub const DEFAULT_MODE: &str = "keyword";
pub const DEFAULT_STATUS: &str = "active";

/// Keyword or semantic search over policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoliciesList {
    pub query: Option<String>,
    pub mode: String,
    pub policy_type: Option<String>,
    pub jurisdiction: Option<String>,
    pub status: String,
}

impl Default for PoliciesList {
    fn default() -> Self {
        PoliciesList {
            query: None,
            mode: DEFAULT_MODE.to_string(),
            policy_type: None,
            jurisdiction: None,
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

impl PoliciesList {
    pub fn path(&self) -> String {
        RequestPath::new("/policies")
            .param("limit", PAGE_SIZE)
            .param_opt("q", self.query.as_deref())
            .param("mode", &self.mode)
            .param_opt("policy_type", self.policy_type.as_deref())
            .param_opt("jurisdiction", self.jurisdiction.as_deref())
            .param("status", &self.status)
            .finish()
    }
}

impl Command for PoliciesList {
    fn name(&self) -> &'static str {
        "policies list"
    }

    fn execute(&self, client: &ApiClient) -> Result<Value, ClientError> {
        client.get(&self.path())
    }

    fn render_table(&self, response: &Value, out: &mut dyn Write) -> io::Result<()> {
        let policies = match data_array(response) {
            Some(policies) => policies,
            None => return writeln!(out, "No policies found"),
        };

        writeln!(out, "Found {} policies:\n", policies.len())?;
        for policy in policies {
            writeln!(out, "ID: {}", field(policy.get("policy_id")))?;
            writeln!(out, "Title: {}", field(policy.get("title")))?;
            writeln!(out, "Type: {}", field(policy.get("policy_type")))?;
            if let Some(jurisdiction) = non_empty(policy, "jurisdiction") {
                writeln!(out, "Jurisdiction: {}", jurisdiction)?;
            }
            writeln!(out, "Status: {}", field(policy.get("status")))?;
            writeln!(out, "---")?;
        }
        Ok(())
    }
}

/// Details of one policy, optionally with criteria, codes, attachments or versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyGet {
    pub policy_id: String,
    pub include: Vec<String>,
}

impl PolicyGet {
    pub fn path(&self) -> String {
        RequestPath::new(format!("/policies/{}", path_segment(&self.policy_id)))
            .param_list("include", &self.include)
            .finish()
    }
}

impl Command for PolicyGet {
    fn name(&self) -> &'static str {
        "policies get"
    }

    fn execute(&self, client: &ApiClient) -> Result<Value, ClientError> {
        client.get(&self.path())
    }

    fn render_table(&self, response: &Value, out: &mut dyn Write) -> io::Result<()> {
        let data = match data_object(response) {
            Some(data) => data,
            None => return writeln!(out, "Invalid response format"),
        };

        writeln!(out, "Policy ID: {}", field(data.get("policy_id")))?;
        writeln!(out, "Title: {}", field(data.get("title")))?;
        writeln!(out, "Type: {}", field(data.get("policy_type")))?;
        writeln!(out, "Status: {}", field(data.get("status")))?;
        if let Some(jurisdiction) = non_empty(data, "jurisdiction") {
            writeln!(out, "Jurisdiction: {}", jurisdiction)?;
        }
        if let Some(date) = non_empty(data, "effective_date") {
            writeln!(out, "Effective Date: {}", date)?;
        }
        if let Some(description) = non_empty(data, "description") {
            writeln!(out, "\nDescription:\n{}", description)?;
        }
        if let Some(summary) = non_empty(data, "summary") {
            writeln!(out, "\nSummary:\n{}", summary)?;
        }
        Ok(())
    }
}
