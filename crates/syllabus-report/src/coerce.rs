//! Loose JSON field coercion
//!
//! Analysis payloads are produced by a language model and routinely carry
//! numbers as strings, nulls in place of missing keys and extra fields.
//! These helpers read a field the way the report views expect it, returning
//! `None` whenever the value cannot stand in for what was asked.

use serde_json::Value;

/// Read a value as display text.
///
/// Strings are kept verbatim, numbers and booleans are formatted. Nulls,
/// arrays and objects count as absent.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text of the first key in `keys` that holds usable text
pub fn first_text(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(entry.get(*key)))
}

/// First key in `keys` that is present and not null
pub fn first_present<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| entry.get(*key))
        .find(|value| !value.is_null())
}

/// Stable record identifier: the payload `id` as text, else the input index
pub fn record_id(entry: &Value, index: usize) -> String {
    text(entry.get("id")).unwrap_or_else(|| index.to_string())
}

/// Whole-value numeric coercion.
///
/// Numeric strings are trimmed and parsed in full (an empty string reads as
/// zero), booleans read as 1 and 0. Non-finite results are rejected.
pub fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Numbers and numeric strings only.
///
/// Unlike [`number`], blank strings and booleans are rejected.
pub fn strict_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Leading-prefix numeric coercion.
///
/// Strings yield the longest decimal literal at their start, so `"0.85 (high)"`
/// reads as 0.85. Anything that is neither a number nor a string is rejected,
/// as are non-finite results.
pub fn float_prefix(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();

    let mut literal = String::new();
    let mut pos = 0;

    if let Some(sign @ (b'+' | b'-')) = bytes.first() {
        literal.push(*sign as char);
        pos = 1;
    }

    let int_digits = digit_run(bytes, pos);
    let int_part = &s[pos..pos + int_digits];
    pos += int_digits;

    let mut frac_part = "";
    if bytes.get(pos) == Some(&b'.') {
        let frac_digits = digit_run(bytes, pos + 1);
        if frac_digits > 0 {
            frac_part = &s[pos + 1..pos + 1 + frac_digits];
            pos += 1 + frac_digits;
        } else if int_digits > 0 {
            pos += 1;
        }
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    literal.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        literal.push('.');
        literal.push_str(frac_part);
    }

    if let Some(b'e' | b'E') = bytes.get(pos) {
        let mut exp_pos = pos + 1;
        let mut exp_sign = "";
        if let Some(sign @ (b'+' | b'-')) = bytes.get(exp_pos) {
            exp_sign = if *sign == b'-' { "-" } else { "" };
            exp_pos += 1;
        }
        let exp_digits = digit_run(bytes, exp_pos);
        if exp_digits > 0 {
            literal.push('e');
            literal.push_str(exp_sign);
            literal.push_str(&s[exp_pos..exp_pos + exp_digits]);
        }
    }

    literal.parse::<f64>().ok()
}

fn digit_run(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map(|rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
        .unwrap_or(0)
}
