//! Alias-path resolution
//!
//! The analysis service has shipped several response shapes for the same
//! logical data: a bare array, an object holding the array under a known key,
//! or the same object nested under a `report` wrapper. Each report declares an
//! ordered list of extractors; the first one that matches wins.

use serde_json::Value;

/// Locates a candidate record array inside a payload
pub type SequenceExtractor = fn(&Value) -> Option<&Vec<Value>>;

/// Locates a candidate aggregate object inside a payload
pub type AggregateExtractor = fn(&Value) -> Option<&Value>;

/// Resolve the record array of a payload.
///
/// Extractors are tried in order and the first array found is returned, even
/// when it is empty. A payload none of them recognizes resolves to an empty
/// slice.
pub fn resolve_sequence<'a>(payload: &'a Value, extractors: &[SequenceExtractor]) -> &'a [Value] {
    extractors
        .iter()
        .find_map(|extract| extract(payload))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Resolve a single aggregate object of a payload.
///
/// Candidates produced by the extractors are checked in order against
/// `accept`; the first accepted candidate wins.
pub fn resolve_aggregate<'a>(
    payload: &'a Value,
    extractors: &[AggregateExtractor],
    accept: fn(&Value) -> bool,
) -> Option<&'a Value> {
    extractors
        .iter()
        .filter_map(|extract| extract(payload))
        .find(|candidate| accept(candidate))
}

/// The payload itself, when it is an array
pub fn bare_array(payload: &Value) -> Option<&Vec<Value>> {
    payload.as_array()
}

/// The `report` wrapper object, when present
pub fn report_wrapper(payload: &Value) -> Option<&Value> {
    payload.get("report").filter(|report| report.is_object())
}

/// The first element of an array payload
pub fn first_element(payload: &Value) -> Option<&Value> {
    payload.as_array()?.first()
}

/// The payload itself
pub fn whole_payload(payload: &Value) -> Option<&Value> {
    Some(payload)
}
