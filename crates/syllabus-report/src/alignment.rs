//! Paper alignment report
//!
//! Normalizes the per-question judgments returned by `analyze-paper` into
//! [`AlignmentRecord`]s, and derives the confidence pills, summary counts and
//! topic coverage slices the alignment view shows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::coerce;
use crate::resolve::{self, SequenceExtractor};

/// Colors assigned to coverage slices in first-seen topic order
pub const PALETTE: [&str; 8] = [
    "#10b981", "#f59e0b", "#ef4444", "#6366f1", "#14b8a6", "#8b5cf6", "#22c55e", "#fb7185",
];

const ALIGNMENT_SOURCES: &[SequenceExtractor] = &[
    resolve::bare_array,
    paper_analysis,
    report_paper_analysis,
];

fn paper_analysis(payload: &Value) -> Option<&Vec<Value>> {
    payload.get("paper_analysis")?.as_array()
}

fn report_paper_analysis(payload: &Value) -> Option<&Vec<Value>> {
    resolve::report_wrapper(payload)?
        .get("paper_analysis")?
        .as_array()
}

/// Outcome of checking one question against the syllabus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignmentStatus {
    #[serde(rename = "aligned")]
    Aligned,
    #[serde(rename = "need_review")]
    NeedsReview,
    #[serde(rename = "out_of_scope")]
    OutOfScope,
}

impl AlignmentStatus {
    pub const ALL: [AlignmentStatus; 3] = [Self::Aligned, Self::NeedsReview, Self::OutOfScope];

    /// Parse the wire value. Matching is exact and case-sensitive.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "aligned" => Some(Self::Aligned),
            "need_review" => Some(Self::NeedsReview),
            "out_of_scope" => Some(Self::OutOfScope),
            _ => None,
        }
    }

    /// Pill label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Aligned => "Aligned",
            Self::NeedsReview => "Needs Review",
            Self::OutOfScope => "Out of Syllabus",
        }
    }
}

/// Confidence bucket shown next to each question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Bucket a confidence value: below 0.3 is low, below 0.7 medium, the
    /// rest high. NaN falls into `Low`.
    pub fn from_confidence(confidence: f64) -> Self {
        if !(confidence >= 0.3) {
            Self::Low
        } else if confidence < 0.7 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// One syllabus-question judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub id: String,
    pub question_number: u32,
    pub topic: String,
    pub status: AlignmentStatus,
    /// Always within `[0, 1]`
    pub confidence: f64,
    pub elaboration: Option<String>,
}

impl AlignmentRecord {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }

    /// Whether the row can be expanded to show an explanation
    pub fn has_details(&self) -> bool {
        self.elaboration.as_deref().is_some_and(|text| !text.is_empty())
    }
}

/// Normalize an alignment payload into records, preserving input order.
///
/// Entries whose `status` is missing or unrecognized are dropped.
pub fn normalize_alignment(payload: &Value) -> Vec<AlignmentRecord> {
    let entries = resolve::resolve_sequence(payload, ALIGNMENT_SOURCES);
    let records: Vec<AlignmentRecord> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| alignment_record(entry, index))
        .collect();

    let dropped = entries.len() - records.len();
    if dropped > 0 {
        debug!(
            dropped,
            kept = records.len(),
            "Skipped alignment entries with unrecognized status"
        );
    }

    records
}

fn alignment_record(entry: &Value, index: usize) -> Option<AlignmentRecord> {
    let status = entry
        .get("status")
        .and_then(Value::as_str)
        .and_then(AlignmentStatus::from_wire)?;

    let position = u32::try_from(index + 1).unwrap_or(u32::MAX);

    let question_number = coerce::first_present(entry, &["question_no"])
        .and_then(coerce::number)
        .and_then(positive_integer)
        .unwrap_or(position);

    let confidence = coerce::first_present(entry, &["confidence", "score"])
        .and_then(coerce::float_prefix)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    let topic =
        coerce::first_text(entry, &["topic"]).unwrap_or_else(|| format!("Question {}", position));

    let elaboration =
        coerce::first_text(entry, &["elaboration", "notes"]).filter(|text| !text.is_empty());

    Some(AlignmentRecord {
        id: coerce::record_id(entry, index),
        question_number,
        topic,
        status,
        confidence,
        elaboration,
    })
}

fn positive_integer(value: f64) -> Option<u32> {
    if value >= 1.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

/// Per-status counts for the summary cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    pub total: usize,
    pub aligned: usize,
    pub need_review: usize,
    pub out_of_scope: usize,
}

impl AlignmentSummary {
    pub fn from_records(records: &[AlignmentRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            acc.total += 1;
            match record.status {
                AlignmentStatus::Aligned => acc.aligned += 1,
                AlignmentStatus::NeedsReview => acc.need_review += 1,
                AlignmentStatus::OutOfScope => acc.out_of_scope += 1,
            }
            acc
        })
    }

    pub fn count(&self, status: AlignmentStatus) -> usize {
        match status {
            AlignmentStatus::Aligned => self.aligned,
            AlignmentStatus::NeedsReview => self.need_review,
            AlignmentStatus::OutOfScope => self.out_of_scope,
        }
    }
}

/// One slice of the topic coverage chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSlice {
    pub topic: String,
    pub count: usize,
    pub color: &'static str,
}

impl TopicSlice {
    /// Share of `total` in percent, rounded to one decimal place
    pub fn share_percent(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        (self.count as f64 / total as f64 * 1000.0).round() / 10.0
    }
}

/// Group records by exact topic text in first-seen order
pub fn topic_coverage(records: &[AlignmentRecord]) -> Vec<TopicSlice> {
    let mut slices: Vec<TopicSlice> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match positions.get(record.topic.as_str()) {
            Some(&slot) => slices[slot].count += 1,
            None => {
                positions.insert(record.topic.as_str(), slices.len());
                slices.push(TopicSlice {
                    topic: record.topic.clone(),
                    count: 1,
                    color: PALETTE[slices.len() % PALETTE.len()],
                });
            }
        }
    }

    slices
}

/// Everything the alignment view renders for one load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignmentReport {
    pub records: Vec<AlignmentRecord>,
    pub summary: AlignmentSummary,
    pub coverage: Vec<TopicSlice>,
}

impl AlignmentReport {
    pub fn from_payload(payload: &Value) -> Self {
        Self::from_records(normalize_alignment(payload))
    }

    pub fn from_records(records: Vec<AlignmentRecord>) -> Self {
        let summary = AlignmentSummary::from_records(&records);
        let coverage = topic_coverage(&records);
        Self {
            records,
            summary,
            coverage,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_single_valid_entry_with_out_of_range_confidence() {
        let payload = json!([
            { "question_no": 2, "status": "aligned", "confidence": 1.4 },
            { "status": "bogus" }
        ]);

        let report = AlignmentReport::from_payload(&payload);

        assert_eq!(report.records.len(), 1);
        let record = &report.records[0];
        assert_eq!(record.question_number, 2);
        assert_eq!(record.status, AlignmentStatus::Aligned);
        assert_eq!(record.confidence, 1.0);
        assert_eq!(
            report.summary,
            AlignmentSummary {
                total: 1,
                aligned: 1,
                need_review: 0,
                out_of_scope: 0,
            }
        );
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let payload = json!({ "paper_analysis": [
            { "status": "need_review" },
            { "status": "out_of_scope", "question_no": "abc", "confidence": "n/a" }
        ]});

        let records = normalize_alignment(&payload);

        assert_eq!(
            records,
            vec![
                AlignmentRecord {
                    id: "0".to_string(),
                    question_number: 1,
                    topic: "Question 1".to_string(),
                    status: AlignmentStatus::NeedsReview,
                    confidence: 0.0,
                    elaboration: None,
                },
                AlignmentRecord {
                    id: "1".to_string(),
                    question_number: 2,
                    topic: "Question 2".to_string(),
                    status: AlignmentStatus::OutOfScope,
                    confidence: 0.0,
                    elaboration: None,
                },
            ]
        );
    }

    #[test]
    fn test_defaults_use_input_position_not_output_position() {
        let payload = json!([{ "status": "unknown" }, { "status": "aligned" }]);
        let records = normalize_alignment(&payload);
        assert_eq!(records[0].question_number, 2);
        assert_eq!(records[0].topic, "Question 2");
        assert_eq!(records[0].id, "1");
    }

    #[test]
    fn test_nested_report_shape() {
        let payload = json!({ "report": { "paper_analysis": [
            { "id": "q1", "status": "aligned", "topic": "Algebra", "score": "0.55", "notes": "Covered in 2.1" }
        ]}});

        let records = normalize_alignment(&payload);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "q1");
        assert_eq!(records[0].confidence, 0.55);
        assert_eq!(records[0].elaboration.as_deref(), Some("Covered in 2.1"));
        assert!(records[0].has_details());
    }

    #[test]
    fn test_confidence_takes_precedence_over_score() {
        let payload = json!([
            { "status": "aligned", "confidence": "garbage", "score": 0.9 },
            { "status": "aligned", "confidence": null, "score": 0.9 },
            { "status": "aligned", "confidence": -3 }
        ]);
        let records = normalize_alignment(&payload);
        assert_eq!(records[0].confidence, 0.0);
        assert_eq!(records[1].confidence, 0.9);
        assert_eq!(records[2].confidence, 0.0);
    }

    #[test]
    fn test_question_number_must_be_positive_integer() {
        let payload = json!([
            { "status": "aligned", "question_no": 0 },
            { "status": "aligned", "question_no": 2.5 },
            { "status": "aligned", "question_no": " 14 " },
            { "status": "aligned", "question_no": null }
        ]);
        let numbers: Vec<u32> = normalize_alignment(&payload)
            .iter()
            .map(|r| r.question_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 14, 4]);
    }

    #[test]
    fn test_status_matching_is_case_sensitive() {
        let payload = json!([{ "status": "Aligned" }, { "status": "NEED_REVIEW" }]);
        assert!(normalize_alignment(&payload).is_empty());
    }

    #[test]
    fn test_empty_elaboration_has_no_details() {
        let payload = json!([{ "status": "aligned", "elaboration": "", "notes": "ignored" }]);
        let records = normalize_alignment(&payload);
        assert_eq!(records[0].elaboration, None);
        assert!(!records[0].has_details());
    }

    #[test]
    fn test_confidence_bucket_boundaries() {
        assert_eq!(ConfidenceLevel::from_confidence(0.0), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confidence(0.2999), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confidence(0.3), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.6999), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.7), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(1.0), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(f64::NAN), ConfidenceLevel::Low);
    }

    #[test]
    fn test_topic_coverage_first_seen_order_and_palette() {
        let topics = [
            "Algebra", "Vectors", "algebra", "Algebra", "Graphs", "Sets", "Logs", "Trig",
            "Calculus", "Matrices",
        ];
        let payload = Value::Array(
            topics
                .iter()
                .map(|t| json!({ "status": "aligned", "topic": t }))
                .collect(),
        );
        let records = normalize_alignment(&payload);

        let coverage = topic_coverage(&records);

        let names: Vec<&str> = coverage.iter().map(|s| s.topic.as_str()).collect();
        assert_eq!(
            names,
            vec!["Algebra", "Vectors", "algebra", "Graphs", "Sets", "Logs", "Trig", "Calculus", "Matrices"]
        );
        assert_eq!(coverage[0].count, 2);
        assert_eq!(coverage[0].color, PALETTE[0]);
        assert_eq!(coverage[7].color, PALETTE[7]);
        assert_eq!(coverage[8].color, PALETTE[0]);
    }

    #[test]
    fn test_share_percent_rounding() {
        let slice = TopicSlice {
            topic: "Algebra".to_string(),
            count: 1,
            color: PALETTE[0],
        };
        assert_eq!(slice.share_percent(3), 33.3);
        assert_eq!(slice.share_percent(0), 0.0);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(AlignmentStatus::Aligned.label(), "Aligned");
        assert_eq!(AlignmentStatus::NeedsReview.label(), "Needs Review");
        assert_eq!(AlignmentStatus::OutOfScope.label(), "Out of Syllabus");
        assert_eq!(
            serde_json::to_value(AlignmentStatus::NeedsReview).unwrap(),
            json!("need_review")
        );
    }
}
