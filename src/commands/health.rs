use std::io::{self, Write};

use serde_json::Value;

use super::{data_object, Command};
use crate::client::{ApiClient, ClientError};
use crate::output::field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health;

impl Command for Health {
    fn name(&self) -> &'static str {
        "health"
    }

    fn execute(&self, client: &ApiClient) -> Result<Value, ClientError> {
        client.get("/health")
    }

    fn render_table(&self, response: &Value, out: &mut dyn Write) -> io::Result<()> {
        let data = match data_object(response) {
            Some(data) => data,
            None => return writeln!(out, "Invalid response format"),
        };

        writeln!(out, "Status: {}", field(data.get("status")))?;
        writeln!(out, "Version: {}", field(data.get("version")))?;
        writeln!(out, "Timestamp: {}", field(data.get("timestamp")))?;

        if let Some(checks) = data.get("checks").and_then(Value::as_object) {
            writeln!(out, "\nChecks:")?;
            for (name, check) in checks {
                if check.is_object() {
                    writeln!(out, "  {}: {}", name, field(check.get("status")))?;
                }
            }
        }
        Ok(())
    }
}
