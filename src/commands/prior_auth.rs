use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use super::{data_object, Command};
use crate::client::{ApiClient, ClientError};
use crate::output::field;

pub const DEFAULT_PAYER: &str = "medicare";
const CRITERIA_PAGE: u32 = 1;
const CRITERIA_PER_PAGE: u32 = 25;

/// Body of `POST /prior-auth/check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorAuthRequest {
    pub procedure_codes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnosis_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub payer: String,
    pub criteria_page: u32,
    pub criteria_per_page: u32,
}

/// Checks whether procedures need prior authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorAuth {
    pub procedure_codes: Vec<String>,
    pub diagnosis_codes: Vec<String>,
    pub state: Option<String>,
    pub payer: String,
}

impl PriorAuth {
    pub fn body(&self) -> PriorAuthRequest {
        PriorAuthRequest {
            procedure_codes: self.procedure_codes.clone(),
            diagnosis_codes: self.diagnosis_codes.clone(),
            state: self.state.clone().filter(|state| !state.is_empty()),
            payer: self.payer.clone(),
            criteria_page: CRITERIA_PAGE,
            criteria_per_page: CRITERIA_PER_PAGE,
        }
    }
}

impl Command for PriorAuth {
    fn name(&self) -> &'static str {
        "prior-auth"
    }

    fn execute(&self, client: &ApiClient) -> Result<Value, ClientError> {
        client.post("/prior-auth/check", &self.body())
    }

    fn render_table(&self, response: &Value, out: &mut dyn Write) -> io::Result<()> {
        let data = match data_object(response) {
            Some(data) => data,
            None => return writeln!(out, "Invalid response format"),
        };

        writeln!(
            out,
            "Prior Authorization Required: {}",
            field(data.get("pa_required"))
        )?;
        writeln!(out, "Confidence: {}", field(data.get("confidence")))?;
        writeln!(out, "Reason: {}\n", field(data.get("reason")))?;

        let policies = data
            .get("matched_policies")
            .and_then(Value::as_array)
            .filter(|policies| !policies.is_empty());
        if let Some(policies) = policies {
            writeln!(out, "Matched Policies:")?;
            for policy in policies {
                writeln!(
                    out,
                    "  - {}: {}",
                    field(policy.get("policy_id")),
                    field(policy.get("title"))
                )?;
            }
            writeln!(out)?;
        }

        let checklist = data
            .get("documentation_checklist")
            .and_then(Value::as_array)
            .filter(|checklist| !checklist.is_empty());
        if let Some(checklist) = checklist {
            writeln!(out, "Documentation Checklist:")?;
            for item in checklist {
                writeln!(out, "  - {}", field(Some(item)))?;
            }
        }
        Ok(())
    }
}
