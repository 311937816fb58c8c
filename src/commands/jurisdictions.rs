use std::io::{self, Write};

use serde_json::Value;

use super::{data_array, Command};
use crate::client::{ApiClient, ClientError};
use crate::output::field;

/// Lists the Medicare Administrative Contractor jurisdictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jurisdictions;

impl Command for Jurisdictions {
    fn name(&self) -> &'static str {
        "jurisdictions"
    }

    fn execute(&self, client: &ApiClient) -> Result<Value, ClientError> {
        client.get("/jurisdictions")
    }

    fn render_table(&self, response: &Value, out: &mut dyn Write) -> io::Result<()> {
        let jurisdictions = match data_array(response) {
            Some(jurisdictions) => jurisdictions,
            None => return writeln!(out, "No jurisdictions found"),
        };

        writeln!(out, "Found {} jurisdictions:\n", jurisdictions.len())?;
        for jurisdiction in jurisdictions {
            writeln!(
                out,
                "{:<6} {}",
                field(jurisdiction.get("jurisdiction_code")),
                field(jurisdiction.get("mac_name"))
            )?;
            let states = jurisdiction
                .get("states")
                .and_then(Value::as_array)
                .filter(|states| !states.is_empty());
            if let Some(states) = states {
                let states: Vec<String> = states.iter().map(|state| field(Some(state))).collect();
                writeln!(out, "       States: {}", states.join(", "))?;
            }
            writeln!(out, "---")?;
        }
        Ok(())
    }
}
