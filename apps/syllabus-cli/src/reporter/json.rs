//! JSON reporter

use anyhow::Result;

use super::RenderedReport;

pub struct JsonReporter;

impl JsonReporter {
    /// Serialize the report, pretty-printed when `pretty` is set
    pub fn format(report: &RenderedReport, pretty: bool) -> Result<String> {
        let mut output = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        output.push('\n');
        Ok(output)
    }
}
