pub mod html;
pub mod terminal;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::locale::Locale;
use crate::model::{ChangedField, FieldDescriptor, FieldType};
use crate::normalize::{self, NormalizeOptions};
use crate::utils;

pub use html::HtmlPresenter;
pub use terminal::TerminalPresenter;

/// A formatted value; `Empty` is rendered as a marker, never as content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum DisplayValue {
    Empty,
    Text(String),
}

impl DisplayValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn text_or<'a>(&'a self, marker: &'a str) -> &'a str {
        match self {
            Self::Empty => marker,
            Self::Text(s) => s,
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str(""),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn format_checkbox(value: &Value, locale: Locale) -> String {
    let normalized = normalize::normalize(value, &NormalizeOptions::default());
    if normalized == "1" {
        locale.yes().to_string()
    } else {
        locale.no().to_string()
    }
}

fn format_choice(descriptor: &FieldDescriptor, value: &Value, raw: &str) -> String {
    if let Some(label) = descriptor.options.get(raw.trim()) {
        return label.clone();
    }
    let normalized = normalize::normalize(value, &NormalizeOptions::default());
    descriptor
        .options
        .get(&normalized)
        .cloned()
        .unwrap_or_else(|| raw.to_string())
}

fn format_date(raw: &str, locale: Locale) -> String {
    if raw.contains('/') {
        return raw.to_string();
    }
    if raw.contains('-') {
        if let Some(dmy) = utils::iso_to_dmy(raw) {
            return dmy;
        }
    }
    match utils::parse_loose_date(raw) {
        Some(date) => date.format(locale.date_pattern()).to_string(),
        None => raw.to_string(),
    }
}

/// Formats a raw value for the review dialog according to the field type.
pub fn format_field_value(descriptor: &FieldDescriptor, value: &Value, locale: Locale) -> DisplayValue {
    let raw = normalize::raw_text(value);
    if raw.trim().is_empty() {
        return DisplayValue::Empty;
    }
    let text = match descriptor.field_type {
        FieldType::Checkbox => format_checkbox(value, locale),
        FieldType::Select | FieldType::Radio => format_choice(descriptor, value, &raw),
        FieldType::Date => format_date(&raw, locale),
        FieldType::Text => raw,
    };
    DisplayValue::Text(text)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub key: String,
    pub label: String,
    pub old_display: DisplayValue,
    pub new_display: DisplayValue,
    pub reason: String,
    pub invalid: bool,
}

impl ReviewRow {
    pub fn from_change(change: &ChangedField, locale: Locale) -> Self {
        Self {
            key: change.key.clone(),
            label: change.label().to_string(),
            old_display: format_field_value(&change.descriptor, &change.old_value, locale),
            new_display: format_field_value(&change.descriptor, &change.new_value, locale),
            reason: String::new(),
            invalid: false,
        }
    }
}

pub fn build_rows(changes: &[ChangedField], locale: Locale) -> Vec<ReviewRow> {
    changes
        .iter()
        .map(|c| ReviewRow::from_change(c, locale))
        .collect()
}

/// Rendering side of a review session. The session owns the rows and calls
/// back into the presenter on every visible state change.
pub trait ReviewPresenter {
    fn present(&mut self, rows: &[ReviewRow]);

    fn focus_reason(&mut self, index: usize);

    /// Called whenever reasons were edited.
    fn update_reasons(&mut self, rows: &[ReviewRow]);

    /// Called after a failed submit with the rows in their current state.
    fn mark_invalid(&mut self, rows: &[ReviewRow]);

    fn close(&mut self);
}

impl<P: ReviewPresenter + ?Sized> ReviewPresenter for &mut P {
    fn present(&mut self, rows: &[ReviewRow]) {
        (**self).present(rows)
    }

    fn focus_reason(&mut self, index: usize) {
        (**self).focus_reason(index)
    }

    fn update_reasons(&mut self, rows: &[ReviewRow]) {
        (**self).update_reasons(rows)
    }

    fn mark_invalid(&mut self, rows: &[ReviewRow]) {
        (**self).mark_invalid(rows)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn text(s: &str) -> DisplayValue {
        DisplayValue::Text(s.to_string())
    }

    #[test]
    fn empty_values_use_the_marker() {
        let d = FieldDescriptor::new("a", "A", FieldType::Select);
        for v in [json!(null), json!(""), json!("  ")] {
            assert_eq!(format_field_value(&d, &v, Locale::En), DisplayValue::Empty);
        }
        assert_eq!(DisplayValue::Empty.text_or(Locale::Es.empty_marker()), "(vacío)");
    }

    #[test]
    fn checkbox_is_localized() {
        let d = FieldDescriptor::new("c", "Consent", FieldType::Checkbox);
        assert_eq!(format_field_value(&d, &json!(true), Locale::En), text("Yes"));
        assert_eq!(format_field_value(&d, &json!("1"), Locale::Es), text("Sí"));
        assert_eq!(format_field_value(&d, &json!("0"), Locale::En), text("No"));
        assert_eq!(format_field_value(&d, &json!(false), Locale::Es), text("No"));
    }

    #[test]
    fn select_and_radio_use_option_labels() {
        let d = FieldDescriptor::new("s", "Site", FieldType::Select)
            .with_option("1", "Madrid")
            .with_option("2", "Lima");
        assert_eq!(format_field_value(&d, &json!("2"), Locale::En), text("Lima"));
        assert_eq!(format_field_value(&d, &json!(1), Locale::En), text("Madrid"));
        assert_eq!(format_field_value(&d, &json!("9"), Locale::En), text("9"));

        let r = FieldDescriptor::new("r", "Arm", FieldType::Radio).with_option("1", "Active");
        assert_eq!(format_field_value(&r, &json!(true), Locale::En), text("Active"));
    }

    #[test]
    fn dates_are_shown_day_first() {
        let d = FieldDescriptor::new("d", "Visit", FieldType::Date);
        assert_eq!(
            format_field_value(&d, &json!("1/2/2024"), Locale::En),
            text("1/2/2024")
        );
        assert_eq!(
            format_field_value(&d, &json!("2024-02-01"), Locale::En),
            text("01/02/2024")
        );
        assert_eq!(
            format_field_value(&d, &json!("March 5, 2024"), Locale::Es),
            text("05/03/2024")
        );
        assert_eq!(
            format_field_value(&d, &json!("sometime in May"), Locale::En),
            text("sometime in May")
        );
        assert_eq!(
            format_field_value(&d, &json!("2024-13"), Locale::En),
            text("2024-13")
        );
    }

    #[test]
    fn text_passes_through() {
        let d = FieldDescriptor::new("t", "Notes", FieldType::Text);
        assert_eq!(format_field_value(&d, &json!(" raw "), Locale::En), text(" raw "));
        assert_eq!(format_field_value(&d, &json!(12.5), Locale::En), text("12.5"));
    }
}
