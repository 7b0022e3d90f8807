//! Report data sources
//!
//! A view normalizes exactly one payload per load: the fresh result of a
//! just-completed analysis when there is one, otherwise the bundled
//! placeholder fixture for that report. The two are never merged.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReportError;

const PAPER_ALIGNMENT_FIXTURE: &str = include_str!("../fixtures/paper_alignment.json");
const SYLLABUS_CHANGES_FIXTURE: &str = include_str!("../fixtures/syllabus_changes.json");
const SYLLABUS_MAPPING_FIXTURE: &str = include_str!("../fixtures/syllabus_mapping.json");

/// The three report views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    PaperAlignment,
    SyllabusChanges,
    SyllabusMapping,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaperAlignment => "paper-alignment",
            Self::SyllabusChanges => "syllabus-changes",
            Self::SyllabusMapping => "syllabus-mapping",
        }
    }

    /// Raw JSON of the bundled placeholder
    pub fn placeholder_json(&self) -> &'static str {
        match self {
            Self::PaperAlignment => PAPER_ALIGNMENT_FIXTURE,
            Self::SyllabusChanges => SYLLABUS_CHANGES_FIXTURE,
            Self::SyllabusMapping => SYLLABUS_MAPPING_FIXTURE,
        }
    }

    pub fn placeholder_payload(&self) -> Result<Value, ReportError> {
        Ok(serde_json::from_str(self.placeholder_json())?)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paper-alignment" | "alignment" | "align" => Ok(Self::PaperAlignment),
            "syllabus-changes" | "changes" | "diff" => Ok(Self::SyllabusChanges),
            "syllabus-mapping" | "mapping" | "similarity" => Ok(Self::SyllabusMapping),
            other => Err(ReportError::UnknownKind(other.to_string())),
        }
    }
}

/// Where a load takes its payload from
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSource {
    /// A payload returned by the analysis service (or read from disk)
    Live(Value),
    /// The bundled fixture for the report kind
    Placeholder,
}

impl ReportSource {
    /// Prefer a fresh payload when one exists
    pub fn from_option(payload: Option<Value>) -> Self {
        match payload {
            Some(payload) => Self::Live(payload),
            None => Self::Placeholder,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// The payload this source stands for
    pub fn payload(&self, kind: ReportKind) -> Result<Cow<'_, Value>, ReportError> {
        match self {
            Self::Live(payload) => Ok(Cow::Borrowed(payload)),
            Self::Placeholder => Ok(Cow::Owned(kind.placeholder_payload()?)),
        }
    }
}
