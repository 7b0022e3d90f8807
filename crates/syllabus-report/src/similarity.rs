//! Syllabus mapping (similarity) report
//!
//! Unlike the alignment and change reports this is a single aggregate: one
//! score, one label and a structured justification comparing two syllabi.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::coerce;
use crate::resolve::{self, AggregateExtractor};

/// Scores at or above this are highly mappable
pub const HIGHLY_MAPPABLE_THRESHOLD: f64 = 70.0;

pub const HIGHLY_MAPPABLE: &str = "Highly Mappable";
pub const PARTIALLY_MAPPABLE: &str = "Partially Mappable";

const MAPPING_SOURCES: &[AggregateExtractor] = &[
    resolve::first_element,
    resolve::report_wrapper,
    resolve::whole_payload,
];

const MAPPING_KEYS: [&str; 4] = [
    "similarity_score",
    "score",
    "similarity_label",
    "ai_justification",
];

fn is_mapping_report(candidate: &Value) -> bool {
    candidate
        .as_object()
        .is_some_and(|object| MAPPING_KEYS.iter().any(|key| object.contains_key(*key)))
}

/// Label for a score when the payload does not supply one
pub fn derive_label(score: Option<f64>) -> &'static str {
    match score {
        Some(score) if score >= HIGHLY_MAPPABLE_THRESHOLD => HIGHLY_MAPPABLE,
        _ => PARTIALLY_MAPPABLE,
    }
}

/// Pill color tier for the label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingTier {
    High,
    Partial,
}

/// AI-written reasoning behind the score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Justification {
    pub overview: Option<String>,
    pub key_similarities: Vec<String>,
    pub key_differences: Vec<String>,
    pub recommendation: Option<String>,
}

impl Justification {
    fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|v| v.is_object()) else {
            return Self::default();
        };

        Self {
            overview: non_empty_text(value, "overview"),
            key_similarities: text_list(value.get("key_similarities")),
            key_differences: text_list(value.get("key_differences")),
            recommendation: non_empty_text(value, "recommendation"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.overview.is_none()
            && self.key_similarities.is_empty()
            && self.key_differences.is_empty()
            && self.recommendation.is_none()
    }
}

fn non_empty_text(value: &Value, key: &str) -> Option<String> {
    coerce::text(value.get(key)).filter(|text| !text.is_empty())
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Aggregate comparison of two syllabi
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    /// Percentage score, absent when the service did not produce one
    pub score: Option<f64>,
    pub label: String,
    pub justification: Justification,
}

impl SimilarityReport {
    /// Fill of the similarity bar in percent
    pub fn progress_width(&self) -> f64 {
        self.score.unwrap_or(0.0).clamp(0.0, 100.0)
    }

    /// Score as shown in the header, e.g. `"82%"` or `"N/A"`
    pub fn score_text(&self) -> String {
        match self.score {
            Some(score) => format!("{}%", score.round() as i64),
            None => "N/A".to_string(),
        }
    }

    pub fn tier(&self) -> MappingTier {
        let high_score = self
            .score
            .is_some_and(|score| score >= HIGHLY_MAPPABLE_THRESHOLD);
        if self.label == HIGHLY_MAPPABLE || high_score {
            MappingTier::High
        } else {
            MappingTier::Partial
        }
    }
}

/// Normalize a mapping payload.
///
/// Accepts an array (first element), a `report` wrapper or a bare object.
/// Returns `None` when no candidate carries any mapping field.
pub fn normalize_similarity(payload: &Value) -> Option<SimilarityReport> {
    let Some(report) = resolve::resolve_aggregate(payload, MAPPING_SOURCES, is_mapping_report)
    else {
        debug!("Mapping payload has no recognizable report object");
        return None;
    };

    let score = coerce::first_present(report, &["similarity_score", "score"])
        .and_then(coerce::strict_number);

    let label = coerce::first_text(report, &["similarity_label"])
        .unwrap_or_else(|| derive_label(score).to_string());

    Some(SimilarityReport {
        score,
        label,
        justification: Justification::from_value(report.get("ai_justification")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_label_threshold() {
        assert_eq!(derive_label(Some(70.0)), HIGHLY_MAPPABLE);
        assert_eq!(derive_label(Some(69.999)), PARTIALLY_MAPPABLE);
        assert_eq!(derive_label(None), PARTIALLY_MAPPABLE);
    }

    #[test]
    fn test_explicit_label_overrides_score() {
        let report = normalize_similarity(&json!({
            "similarity_score": 95,
            "similarity_label": "Not Mappable"
        }))
        .unwrap();
        assert_eq!(report.label, "Not Mappable");
        assert_eq!(report.tier(), MappingTier::High);
    }

    #[test]
    fn test_empty_label_is_kept() {
        let report = normalize_similarity(&json!({
            "similarity_score": 95,
            "similarity_label": ""
        }))
        .unwrap();
        assert_eq!(report.label, "");
        assert_eq!(report.score_text(), "95%");
    }

    #[test]
    fn test_null_label_is_derived() {
        let report = normalize_similarity(&json!({
            "similarity_score": 95,
            "similarity_label": null
        }))
        .unwrap();
        assert_eq!(report.label, HIGHLY_MAPPABLE);
    }

    #[test]
    fn test_non_numeric_scores_are_absent() {
        for score in [json!(true), json!(""), json!("  "), json!("high"), json!([80])] {
            let report = normalize_similarity(&json!({ "similarity_score": score.clone() })).unwrap();
            assert_eq!(report.score, None, "score {:?}", score);
            assert_eq!(report.score_text(), "N/A");
            assert_eq!(report.label, PARTIALLY_MAPPABLE);
        }
    }

    #[test]
    fn test_array_payload_uses_first_entry() {
        let payload = json!([
            { "similarity_score": 42, "ai_justification": { "overview": "Different focus" } },
            { "similarity_score": 99 }
        ]);
        let report = normalize_similarity(&payload).unwrap();
        assert_eq!(report.score, Some(42.0));
        assert_eq!(report.label, PARTIALLY_MAPPABLE);
        assert_eq!(report.tier(), MappingTier::Partial);
        assert_eq!(report.justification.overview.as_deref(), Some("Different focus"));
    }

    #[test]
    fn test_report_wrapper() {
        let payload = json!({ "success": true, "report": { "similarity_score": "81.6" } });
        let report = normalize_similarity(&payload).unwrap();
        assert_eq!(report.score, Some(81.6));
        assert_eq!(report.score_text(), "82%");
        assert_eq!(report.label, HIGHLY_MAPPABLE);
    }

    #[test]
    fn test_unrecognized_shapes_are_none() {
        assert_eq!(normalize_similarity(&json!([])), None);
        assert_eq!(normalize_similarity(&json!({ "success": true })), None);
        assert_eq!(normalize_similarity(&json!("oops")), None);
        assert_eq!(normalize_similarity(&json!([1, 2])), None);
    }

    #[test]
    fn test_progress_width_clamps() {
        let mut report = normalize_similarity(&json!({ "similarity_score": 140 })).unwrap();
        assert_eq!(report.progress_width(), 100.0);
        report.score = Some(-5.0);
        assert_eq!(report.progress_width(), 0.0);
        report.score = None;
        assert_eq!(report.progress_width(), 0.0);
        assert_eq!(report.score_text(), "N/A");
    }

    #[test]
    fn test_justification_lists_skip_non_strings() {
        let report = normalize_similarity(&json!({
            "similarity_label": "Highly Mappable",
            "ai_justification": {
                "overview": "",
                "key_similarities": ["Algebra retained", 3, null, "Same assessment objectives"],
                "key_differences": "not a list",
                "recommendation": "Reuse existing schemes of work"
            }
        }))
        .unwrap();

        assert_eq!(
            report.justification,
            Justification {
                overview: None,
                key_similarities: vec![
                    "Algebra retained".to_string(),
                    "Same assessment objectives".to_string()
                ],
                key_differences: vec![],
                recommendation: Some("Reuse existing schemes of work".to_string()),
            }
        );
        assert_eq!(report.score, None);
        assert_eq!(report.tier(), MappingTier::High);
    }
}
