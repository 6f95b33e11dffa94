use serde_json::Value;

use crate::locale::Locale;
use crate::utils;

const BLANK_TOKENS: &[&str] = &["null", "none", "na"];

#[derive(Clone, Debug)]
pub struct NormalizeOptions {
    /// Display markers that stand for "no value" and compare as blank.
    pub empty_markers: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            empty_markers: Locale::all_empty_markers(),
        }
    }
}

impl NormalizeOptions {
    fn is_blank_token(&self, lowered: &str) -> bool {
        BLANK_TOKENS.contains(&lowered)
            || self
                .empty_markers
                .iter()
                .any(|m| m.trim().to_lowercase() == lowered)
    }
}

/// Text of a raw value as a form would submit it.
pub fn raw_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Largest magnitude below which every integer is exact in an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn normalize_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if f == 1.0 => "1".to_string(),
        Some(f) if f == 0.0 => "0".to_string(),
        // forms submit 72.0 as "72"
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

fn normalize_text(raw: &str, options: &NormalizeOptions) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lowered = trimmed.to_lowercase();
    match lowered.as_str() {
        "1" | "true" => return "1".to_string(),
        "0" | "false" => return "0".to_string(),
        _ => {}
    }
    if options.is_blank_token(&lowered) {
        return String::new();
    }
    if let Some(iso) = utils::dmy_to_iso(trimmed) {
        return iso;
    }
    trimmed.to_string()
}

/// Canonical comparable form of a raw field value.
pub fn normalize(value: &Value, options: &NormalizeOptions) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(n) => normalize_number(n),
        Value::String(s) => normalize_text(s, options),
        other => other.to_string().trim().to_string(),
    }
}

pub fn is_equivalent(a: &Value, b: &Value, options: &NormalizeOptions) -> bool {
    normalize(a, options) == normalize(b, options)
}
