//! Property-based tests for report normalization
//!
//! Payloads are generated with arbitrary field values so the invariants are
//! checked against the messy shapes the analysis service actually returns.

use proptest::prelude::*;
use serde_json::{json, Value};

use syllabus_report::{
    normalize_alignment, normalize_changes, normalize_similarity, similarity, AlignmentSummary,
    ChangeFilter, ChangeStatus, ChangeSummary, ConfidenceLevel,
};

// ============================================================
// Strategies
// ============================================================

/// Anything the service might put in a scalar slot
fn loose_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1.0e6f64..1.0e6).prop_map(|v| json!(v)),
        any::<i32>().prop_map(|v| json!(v)),
        "[a-z0-9 .-]{0,8}".prop_map(Value::String),
        Just(json!([])),
        Just(json!({})),
    ]
}

fn alignment_status() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!("aligned")),
        Just(json!("need_review")),
        Just(json!("out_of_scope")),
        Just(json!("Aligned")),
        Just(json!("bogus")),
        Just(Value::Null),
        any::<i32>().prop_map(|v| json!(v)),
    ]
}

fn change_status() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!("added")),
        Just(json!("removed")),
        Just(json!("modified")),
        Just(json!("renamed")),
        Just(Value::Null),
    ]
}

fn alignment_entry() -> impl Strategy<Value = Value> {
    (
        alignment_status(),
        loose_scalar(),
        loose_scalar(),
        loose_scalar(),
        loose_scalar(),
    )
        .prop_map(|(status, question_no, confidence, score, topic)| {
            json!({
                "status": status,
                "question_no": question_no,
                "confidence": confidence,
                "score": score,
                "topic": topic,
            })
        })
}

fn change_entry() -> impl Strategy<Value = Value> {
    (change_status(), loose_scalar(), loose_scalar()).prop_map(|(status, title, summary)| {
        json!({ "status": status, "title": title, "change_summary": summary })
    })
}

fn is_valid_alignment_status(value: &Value) -> bool {
    matches!(
        value.as_str(),
        Some("aligned") | Some("need_review") | Some("out_of_scope")
    )
}

fn is_valid_change_status(value: &Value) -> bool {
    matches!(
        value.as_str(),
        Some("added") | Some("removed") | Some("modified")
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ============================================================
    // Alignment Records
    // ============================================================

    #[test]
    fn confidence_always_within_unit_interval(entries in prop::collection::vec(alignment_entry(), 0..24)) {
        let records = normalize_alignment(&Value::Array(entries));
        for record in &records {
            prop_assert!((0.0..=1.0).contains(&record.confidence), "confidence {}", record.confidence);
            prop_assert!(record.question_number >= 1);
        }
    }

    #[test]
    fn invalid_statuses_are_dropped(entries in prop::collection::vec(alignment_entry(), 0..24)) {
        let valid = entries.iter().filter(|e| is_valid_alignment_status(&e["status"])).count();
        let records = normalize_alignment(&json!({ "paper_analysis": entries }));
        prop_assert_eq!(records.len(), valid);
    }

    #[test]
    fn alignment_summary_total_is_sum(entries in prop::collection::vec(alignment_entry(), 0..24)) {
        let records = normalize_alignment(&json!({ "report": { "paper_analysis": entries } }));
        let summary = AlignmentSummary::from_records(&records);
        prop_assert_eq!(summary.total, records.len());
        prop_assert_eq!(summary.total, summary.aligned + summary.need_review + summary.out_of_scope);
    }

    #[test]
    fn bucketing_is_total_and_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(ConfidenceLevel::from_confidence(low) as u8 <= ConfidenceLevel::from_confidence(high) as u8);
    }

    // ============================================================
    // Change Records
    // ============================================================

    #[test]
    fn change_summary_total_is_sum(entries in prop::collection::vec(change_entry(), 0..24)) {
        let valid = entries.iter().filter(|e| is_valid_change_status(&e["status"])).count();
        let records = normalize_changes(&json!({ "changes": entries }));
        let summary = ChangeSummary::from_records(&records);
        prop_assert_eq!(records.len(), valid);
        prop_assert_eq!(summary.total, summary.added + summary.removed + summary.modified);
    }

    #[test]
    fn all_filter_is_sorted_permutation(entries in prop::collection::vec(change_entry(), 0..24)) {
        let records = normalize_changes(&Value::Array(entries));
        let sorted = ChangeFilter::All.apply(&records);
        prop_assert_eq!(sorted.len(), records.len());

        let rank = |status: ChangeStatus| match status {
            ChangeStatus::Added => 0,
            ChangeStatus::Removed => 1,
            ChangeStatus::Modified => 2,
        };
        for pair in sorted.windows(2) {
            prop_assert!(rank(pair[0].status) <= rank(pair[1].status));
        }
    }

    #[test]
    fn status_filter_keeps_only_matching(entries in prop::collection::vec(change_entry(), 0..24)) {
        let records = normalize_changes(&Value::Array(entries));
        let summary = ChangeSummary::from_records(&records);
        for filter in [ChangeFilter::Added, ChangeFilter::Removed, ChangeFilter::Modified] {
            let kept = filter.apply(&records);
            prop_assert_eq!(kept.len(), summary.count_for(filter));
            prop_assert!(kept.iter().all(|r| Some(r.status) == filter.status()));
        }
    }

    // ============================================================
    // Similarity Report
    // ============================================================

    #[test]
    fn label_is_derived_from_score(score in -50.0f64..150.0) {
        let report = normalize_similarity(&json!({ "similarity_score": score })).unwrap();
        let expected = if score >= 70.0 { similarity::HIGHLY_MAPPABLE } else { similarity::PARTIALLY_MAPPABLE };
        prop_assert_eq!(report.label.as_str(), expected);
        prop_assert!((0.0..=100.0).contains(&report.progress_width()));
    }

    #[test]
    fn explicit_label_always_wins(score in -50.0f64..150.0, label in "[A-Za-z ]{0,20}") {
        let report = normalize_similarity(&json!({ "similarity_score": score, "similarity_label": label.clone() })).unwrap();
        prop_assert_eq!(report.label, label);
    }
}
