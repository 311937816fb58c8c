use crate::commands::Command;
use crate::output::OutputFormat;
use crate::Result;
use serde_json::Value;
use std::io::Write;

pub trait Outputter {
    fn response(&mut self, command: &dyn Command, response: &Value) -> Result<()>;
}

pub struct FormattedOutputter<'a, W: Write> {
    writer: &'a mut W,
    format: OutputFormat,
}

impl<'a, W: Write> FormattedOutputter<'a, W> {
    pub fn new(writer: &'a mut W, format: OutputFormat) -> FormattedOutputter<'a, W> {
        FormattedOutputter { writer, format }
    }
}

impl<'a, W: Write> Outputter for FormattedOutputter<'a, W> {
    fn response(&mut self, command: &dyn Command, response: &Value) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(response)?;
                writeln!(self.writer, "{}", json)?;
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml::to_string(response)?;
                self.writer.write_all(yaml.as_bytes())?;
            }
            OutputFormat::Table => command.render_table(response, &mut *self.writer)?,
        }
        self.writer.flush()?;
        Ok(())
    }
}
