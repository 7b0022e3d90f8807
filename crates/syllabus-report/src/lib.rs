//! Syllabus report normalization
//!
//! Turns the loosely-shaped JSON produced by the syllabus analysis service
//! into typed, display-ready reports:
//!
//! - **Paper alignment**: per-question judgments, confidence buckets, summary
//!   counts and topic coverage
//! - **Syllabus changes**: added/removed/modified topics with filter tabs
//! - **Syllabus mapping**: a single similarity score with its justification
//!
//! Normalization never fails on payload shape. Unknown wrappers resolve to an
//! empty report, and entries with an unrecognized status are dropped.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use syllabus_report::{normalize, NormalizedReport, ReportKind, ReportSource};
//!
//! let source = ReportSource::Live(json!([
//!     { "question_no": 2, "status": "aligned", "confidence": 1.4 },
//!     { "status": "bogus" }
//! ]));
//!
//! let NormalizedReport::Alignment(report) = normalize(ReportKind::PaperAlignment, &source)? else {
//!     unreachable!();
//! };
//! assert_eq!(report.records.len(), 1);
//! assert_eq!(report.records[0].confidence, 1.0);
//! # Ok::<(), syllabus_report::ReportError>(())
//! ```

pub mod alignment;
pub mod changes;
pub mod coerce;
pub mod error;
pub mod resolve;
pub mod similarity;
pub mod source;

use serde::Serialize;

pub use alignment::{
    normalize_alignment, topic_coverage, AlignmentRecord, AlignmentReport, AlignmentStatus,
    AlignmentSummary, ConfidenceLevel, TopicSlice,
};
pub use changes::{
    normalize_changes, ChangeFilter, ChangeRecord, ChangeReport, ChangeStatus, ChangeSummary,
};
pub use error::ReportError;
pub use similarity::{normalize_similarity, Justification, MappingTier, SimilarityReport};
pub use source::{ReportKind, ReportSource};

/// A normalized report of any kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "report", rename_all = "kebab-case")]
pub enum NormalizedReport {
    Alignment(AlignmentReport),
    Changes(ChangeReport),
    /// `None` when the payload held no recognizable mapping object
    Mapping(Option<SimilarityReport>),
}

impl NormalizedReport {
    /// Normalize a payload as the given kind
    pub fn from_payload(kind: ReportKind, payload: &serde_json::Value) -> Self {
        match kind {
            ReportKind::PaperAlignment => Self::Alignment(AlignmentReport::from_payload(payload)),
            ReportKind::SyllabusChanges => Self::Changes(ChangeReport::from_payload(payload)),
            ReportKind::SyllabusMapping => Self::Mapping(normalize_similarity(payload)),
        }
    }

    /// The empty state a view falls back to
    pub fn empty(kind: ReportKind) -> Self {
        match kind {
            ReportKind::PaperAlignment => Self::Alignment(AlignmentReport::default()),
            ReportKind::SyllabusChanges => Self::Changes(ChangeReport::default()),
            ReportKind::SyllabusMapping => Self::Mapping(None),
        }
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Alignment(_) => ReportKind::PaperAlignment,
            Self::Changes(_) => ReportKind::SyllabusChanges,
            Self::Mapping(_) => ReportKind::SyllabusMapping,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Alignment(report) => report.is_empty(),
            Self::Changes(report) => report.is_empty(),
            Self::Mapping(report) => report.is_none(),
        }
    }
}

/// Normalize whichever payload `source` stands for
pub fn normalize(kind: ReportKind, source: &ReportSource) -> Result<NormalizedReport, ReportError> {
    let payload = source.payload(kind)?;
    Ok(NormalizedReport::from_payload(kind, &payload))
}
