//! Syllabus change report
//!
//! Normalizes the entries returned by `diff-syllabus` into [`ChangeRecord`]s
//! and provides the filter tabs and counts shown above the change list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::coerce;
use crate::error::ReportError;
use crate::resolve::{self, SequenceExtractor};

const CHANGE_SOURCES: &[SequenceExtractor] = &[
    resolve::bare_array,
    top_level_changes,
    report_syllabi_diff,
    report_changes,
];

fn top_level_changes(payload: &Value) -> Option<&Vec<Value>> {
    payload.get("changes")?.as_array()
}

fn report_syllabi_diff(payload: &Value) -> Option<&Vec<Value>> {
    resolve::report_wrapper(payload)?
        .get("syllabi_diff")?
        .as_array()
}

fn report_changes(payload: &Value) -> Option<&Vec<Value>> {
    resolve::report_wrapper(payload)?.get("changes")?.as_array()
}

/// Kind of difference between two syllabus versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Added,
    Removed,
    Modified,
}

impl ChangeStatus {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "added" => Some(Self::Added),
            "removed" => Some(Self::Removed),
            "modified" => Some(Self::Modified),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::Modified => "Modified",
        }
    }

    /// Sort position in the unfiltered list
    fn rank(&self) -> u8 {
        match self {
            Self::Added => 0,
            Self::Removed => 1,
            Self::Modified => 2,
        }
    }
}

/// One detected difference between two syllabus versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub id: String,
    pub title: String,
    pub status: ChangeStatus,
    pub summary: String,
    pub old_summary: Option<String>,
    pub new_summary: Option<String>,
}

impl ChangeRecord {
    /// Whether the card can be expanded. True when any of the summaries has text.
    pub fn has_details(&self) -> bool {
        !self.summary.is_empty()
            || self.old_summary.as_deref().is_some_and(|s| !s.is_empty())
            || self.new_summary.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Normalize a diff payload into records, preserving input order.
///
/// Entries whose `status` is missing or unrecognized are dropped.
pub fn normalize_changes(payload: &Value) -> Vec<ChangeRecord> {
    let entries = resolve::resolve_sequence(payload, CHANGE_SOURCES);
    let records: Vec<ChangeRecord> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| change_record(entry, index))
        .collect();

    let dropped = entries.len() - records.len();
    if dropped > 0 {
        debug!(
            dropped,
            kept = records.len(),
            "Skipped change entries with unrecognized status"
        );
    }

    records
}

fn change_record(entry: &Value, index: usize) -> Option<ChangeRecord> {
    let status = entry
        .get("status")
        .and_then(Value::as_str)
        .and_then(ChangeStatus::from_wire)?;

    let title = coerce::first_text(entry, &["title", "topic", "topic_name"])
        .unwrap_or_else(|| format!("Change {}", index + 1));

    let summary =
        coerce::first_text(entry, &["change_summary", "description"]).unwrap_or_default();

    Some(ChangeRecord {
        id: coerce::record_id(entry, index),
        title,
        status,
        summary,
        old_summary: non_empty_text(entry, "old_summary"),
        new_summary: non_empty_text(entry, "new_summary"),
    })
}

fn non_empty_text(entry: &Value, key: &str) -> Option<String> {
    coerce::text(entry.get(key)).filter(|text| !text.is_empty())
}

/// Filter tab above the change list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeFilter {
    #[default]
    All,
    Added,
    Removed,
    Modified,
}

impl ChangeFilter {
    pub const ALL: [ChangeFilter; 4] = [Self::All, Self::Added, Self::Removed, Self::Modified];

    /// The status this filter keeps, `None` for `All`
    pub fn status(&self) -> Option<ChangeStatus> {
        match self {
            Self::All => None,
            Self::Added => Some(ChangeStatus::Added),
            Self::Removed => Some(ChangeStatus::Removed),
            Self::Modified => Some(ChangeStatus::Modified),
        }
    }

    pub fn label(&self) -> &'static str {
        match self.status() {
            None => "All",
            Some(status) => status.label(),
        }
    }

    /// Apply the filter.
    ///
    /// `All` keeps every record, stably ordered added, removed, then modified.
    /// A status filter keeps only records with that status, in input order.
    pub fn apply<'a>(&self, records: &'a [ChangeRecord]) -> Vec<&'a ChangeRecord> {
        match self.status() {
            None => {
                let mut sorted: Vec<&ChangeRecord> = records.iter().collect();
                sorted.sort_by_key(|record| record.status.rank());
                sorted
            }
            Some(status) => records
                .iter()
                .filter(|record| record.status == status)
                .collect(),
        }
    }
}

impl fmt::Display for ChangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status() {
            None => f.write_str("all"),
            Some(status) => f.write_str(status.as_str()),
        }
    }
}

impl FromStr for ChangeFilter {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "added" => Ok(Self::Added),
            "removed" => Ok(Self::Removed),
            "modified" => Ok(Self::Modified),
            other => Err(ReportError::UnknownFilter(other.to_string())),
        }
    }
}

/// Per-status counts for the filter tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub total: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl ChangeSummary {
    pub fn from_records(records: &[ChangeRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            acc.total += 1;
            match record.status {
                ChangeStatus::Added => acc.added += 1,
                ChangeStatus::Removed => acc.removed += 1,
                ChangeStatus::Modified => acc.modified += 1,
            }
            acc
        })
    }

    /// Count shown on a filter tab
    pub fn count_for(&self, filter: ChangeFilter) -> usize {
        match filter {
            ChangeFilter::All => self.total,
            ChangeFilter::Added => self.added,
            ChangeFilter::Removed => self.removed,
            ChangeFilter::Modified => self.modified,
        }
    }
}

/// Everything the change view renders for one load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeReport {
    pub records: Vec<ChangeRecord>,
    pub summary: ChangeSummary,
}

impl ChangeReport {
    pub fn from_payload(payload: &Value) -> Self {
        Self::from_records(normalize_changes(payload))
    }

    pub fn from_records(records: Vec<ChangeRecord>) -> Self {
        let summary = ChangeSummary::from_records(&records);
        Self { records, summary }
    }

    pub fn filtered(&self, filter: ChangeFilter) -> Vec<&ChangeRecord> {
        filter.apply(&self.records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
