use serde::Serialize;

use crate::locale::Locale;
use crate::model::{ChangedField, DescriptorSource};
use crate::present::ReviewRow;
use crate::review::Submission;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct DiffRecord {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
    pub old_normalized: String,
    pub new_normalized: String,
    pub old_display: String,
    pub new_display: String,
    pub declared: bool,
}

/// Pairs each change with its review row; both come from the same diff and
/// share ordering.
pub fn build_records(changes: &[ChangedField], rows: &[ReviewRow], locale: Locale) -> Vec<DiffRecord> {
    let marker = locale.empty_marker();
    changes
        .iter()
        .zip(rows.iter())
        .map(|(c, r)| DiffRecord {
            key: c.key.clone(),
            label: c.label().to_string(),
            field_type: c.descriptor.field_type.as_str().to_string(),
            old_value: c.old_value.clone(),
            new_value: c.new_value.clone(),
            old_normalized: c.old_normalized.clone(),
            new_normalized: c.new_normalized.clone(),
            old_display: r.old_display.text_or(marker).to_string(),
            new_display: r.new_display.text_or(marker).to_string(),
            declared: c.descriptor_source == DescriptorSource::Declared,
        })
        .collect()
}

pub fn render_diff_text(records: &[DiffRecord]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            r.key, r.label, r.old_display, r.new_display
        ));
    }
    out.into_bytes()
}

pub fn render_diff_json(records: &[DiffRecord]) -> Vec<u8> {
    serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]\n".to_vec())
}

pub fn render_diff(records: &[DiffRecord], format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_diff_text(records),
        OutputFormat::Json => render_diff_json(records),
    }
}

pub fn render_submission(submission: &Submission, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => {
            let mut out = submission.human_readable_summary.clone();
            out.push('\n');
            out.into_bytes()
        }
        OutputFormat::Json => {
            serde_json::to_vec_pretty(submission).unwrap_or_else(|_| b"{}\n".to_vec())
        }
    }
}
