//! Report output
//!
//! Renders a normalized report in one of several formats:
//!
//! - **Console**: box tables, confidence pills and a similarity bar
//! - **Markdown**: tables and lists for pasting into documents
//! - **JSON**: the normalized report for scripts, compact or pretty

mod console;
mod json;
mod markdown;

use std::io::{self, Write};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use syllabus_report::{ChangeFilter, NormalizedReport};

pub use console::ConsoleReporter;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Console output with tables
    #[default]
    Console,
    /// Markdown format for documentation
    Markdown,
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty)
    }
}

/// A normalized report plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedReport {
    /// `placeholder`, the service URL, or the file the payload was read from
    pub origin: String,
    pub loaded_at: DateTime<Utc>,
    /// Active tab of the change list
    pub filter: ChangeFilter,
    #[serde(flatten)]
    pub report: NormalizedReport,
}

impl RenderedReport {
    pub fn new(origin: impl Into<String>, report: NormalizedReport) -> Self {
        Self {
            origin: origin.into(),
            loaded_at: Utc::now(),
            filter: ChangeFilter::All,
            report,
        }
    }

    pub fn with_filter(mut self, filter: ChangeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_loaded_at(mut self, loaded_at: Option<DateTime<Utc>>) -> Self {
        if let Some(loaded_at) = loaded_at {
            self.loaded_at = loaded_at;
        }
        self
    }
}

pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report to stdout
    pub fn report(&self, report: &RenderedReport) -> Result<()> {
        let output = self.format_report(report)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    pub fn format_report(&self, report: &RenderedReport) -> Result<String> {
        match self.format {
            OutputFormat::Console => ConsoleReporter::format(report),
            OutputFormat::Markdown => MarkdownReporter::format(report),
            OutputFormat::Json => JsonReporter::format(report, false),
            OutputFormat::JsonPretty => JsonReporter::format(report, true),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

/// Shorten `text` to at most `width` characters, marking the cut with `…`
pub(crate) fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
