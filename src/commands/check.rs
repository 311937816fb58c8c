use std::io::{self, Write};

use serde_json::Value;

use super::{data_object, Command, RequestPath};
use crate::client::{ApiClient, ClientError};
use crate::output::{field, non_empty, present};

/// Looks up a CPT, HCPCS, ICD-10 or NDC code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub code: String,
    pub include: Vec<String>,
    pub jurisdiction: Option<String>,
    pub fuzzy: bool,
}

impl Check {
    pub fn path(&self) -> String {
        let path = RequestPath::new("/codes/lookup")
            .param("code", &self.code)
            .param_list("include", &self.include)
            .param_opt("jurisdiction", self.jurisdiction.as_deref());
        if self.fuzzy {
            path.finish()
        } else {
            path.param("fuzzy", false).finish()
        }
    }
}

impl Command for Check {
    fn name(&self) -> &'static str {
        "check"
    }

    fn execute(&self, client: &ApiClient) -> Result<Value, ClientError> {
        client.get(&self.path())
    }

    fn render_table(&self, response: &Value, out: &mut dyn Write) -> io::Result<()> {
        let data = match data_object(response) {
            Some(data) => data,
            None => return writeln!(out, "Invalid response format"),
        };

        writeln!(out, "Code: {}", field(data.get("code")))?;
        writeln!(out, "System: {}", field(data.get("code_system")))?;
        writeln!(out, "Found: {}", field(data.get("found")))?;
        if let Some(description) = non_empty(data, "description") {
            writeln!(out, "Description: {}", description)?;
        }

        if let Some(rvu) = data.get("rvu").filter(|rvu| rvu.is_object()) {
            writeln!(out, "\nRVU Data:")?;
            if let Some(work_rvu) = present(rvu, "work_rvu") {
                writeln!(out, "  Work RVU: {}", work_rvu)?;
            }
            if let Some(price) = present(rvu, "non_facility_price") {
                writeln!(out, "  Non-Facility Price: ${}", price)?;
            }
            if let Some(price) = present(rvu, "facility_price") {
                writeln!(out, "  Facility Price: ${}", price)?;
            }
        }

        let policies = data
            .get("policies")
            .and_then(Value::as_array)
            .filter(|policies| !policies.is_empty());
        if let Some(policies) = policies {
            writeln!(out, "\nPolicies:")?;
            for policy in policies {
                writeln!(
                    out,
                    "  - {} ({}): {}",
                    field(policy.get("policy_id")),
                    field(policy.get("policy_type")),
                    field(policy.get("disposition"))
                )?;
                writeln!(out, "    {}", field(policy.get("title")))?;
            }
        }
        Ok(())
    }
}
