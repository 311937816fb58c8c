use std::io::{self, Write};

use serde_json::Value;

use super::{data_object, Command, RequestPath};
use crate::client::{ApiClient, ClientError};
use crate::output::field;

/// Aggregate Medicaid provider spending per HCPCS code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spending {
    pub codes: Vec<String>,
    pub year: Option<u32>,
}

impl Spending {
    pub fn path(&self) -> String {
        let path = RequestPath::new("/spending/by-code");
        let path = match self.codes.as_slice() {
            [code] => path.param("code", code),
            codes => path.param_list("codes", codes),
        };
        match self.year {
            Some(year) if year > 0 => path.param("year", year).finish(),
            _ => path.finish(),
        }
    }
}

impl Command for Spending {
    fn name(&self) -> &'static str {
        "spending"
    }

    fn execute(&self, client: &ApiClient) -> Result<Value, ClientError> {
        client.get(&self.path())
    }

    fn render_table(&self, response: &Value, out: &mut dyn Write) -> io::Result<()> {
        let by_code = match data_object(response).and_then(Value::as_object) {
            Some(by_code) => by_code,
            None => return writeln!(out, "No spending data found"),
        };

        for (code, spending) in by_code {
            if !spending.is_object() {
                continue;
            }
            writeln!(out, "Code: {}", code)?;
            writeln!(out, "  Total Paid: ${}", field(spending.get("total_paid")))?;
            writeln!(out, "  Total Claims: {}", field(spending.get("total_claims")))?;
            writeln!(
                out,
                "  Unique Beneficiaries: {}",
                field(spending.get("unique_beneficiaries"))
            )?;
            writeln!(
                out,
                "  Unique Providers: {}",
                field(spending.get("unique_providers"))
            )?;

            let by_year = spending
                .get("by_year")
                .and_then(Value::as_array)
                .filter(|by_year| !by_year.is_empty());
            if let Some(by_year) = by_year {
                writeln!(out, "  By Year:")?;
                for year in by_year {
                    writeln!(
                        out,
                        "    {}: ${} ({} claims)",
                        field(year.get("year")),
                        field(year.get("total_paid")),
                        field(year.get("total_claims"))
                    )?;
                }
            }
            writeln!(out, "---")?;
        }
        Ok(())
    }
}
