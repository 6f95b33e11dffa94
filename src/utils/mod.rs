use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

fn dmy_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})(?:\s+.*)?$").expect("static dmy regex")
    })
}

fn iso_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("static iso regex"))
}

/// `D/M/YYYY` or `D/M/YYYY <time>` to `YYYY-MM-DD`. Only the shape is
/// checked, the calendar is not.
pub fn dmy_to_iso(value: &str) -> Option<String> {
    let caps = dmy_regex().captures(value.trim())?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    Some(format!("{}-{:02}-{:02}", &caps[3], month, day))
}

/// `YYYY-MM-DD` (optionally followed by a time part) to `DD/MM/YYYY`.
pub fn iso_to_dmy(value: &str) -> Option<String> {
    let caps = iso_regex().captures(value.trim())?;
    Some(format!("{}/{}/{}", &caps[3], &caps[2], &caps[1]))
}

const LOOSE_DATE_FORMATS: &[&str] = &["%Y%m%d", "%d.%m.%Y", "%d %B %Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y"];

pub fn parse_loose_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.date_naive());
    }
    LOOSE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Splits `key=text` as given to `--reason`.
pub fn parse_reason_assignment(value: &str) -> Result<(String, String), String> {
    let (key, text) = value
        .split_once('=')
        .ok_or_else(|| "expected format KEY=REASON".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("field key is empty".to_string());
    }
    let text = text.trim();
    if text.is_empty() {
        return Err("reason text is empty".to_string());
    }
    Ok((key.to_string(), text.to_string()))
}

pub fn parse_csv_list(value: &str) -> Result<Vec<String>, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("list is empty".to_string());
    }
    let mut out: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for part in raw.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        if seen.insert(item.to_string()) {
            out.push(item.to_string());
        }
    }
    if out.is_empty() {
        return Err("list is empty".to_string());
    }
    Ok(out)
}
