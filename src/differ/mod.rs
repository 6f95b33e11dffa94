mod filters;

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{ChangedField, DescriptorSet, RecordSnapshot};
use crate::normalize::{self, NormalizeOptions};

pub use filters::DEFAULT_REPEATING_GROUP_PATTERN;

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("invalid repeating-group pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Clone, Debug)]
pub struct DiffOptions {
    pub normalize: NormalizeOptions,
    /// Regex for keys that belong to repeating groups; empty disables it.
    pub repeating_group_pattern: String,
    pub excluded_keys: Vec<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            repeating_group_pattern: DEFAULT_REPEATING_GROUP_PATTERN.to_string(),
            excluded_keys: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Differ {
    normalize: NormalizeOptions,
    filters: filters::KeyFilters,
}

impl Differ {
    pub fn new(options: DiffOptions) -> Result<Self, DiffError> {
        let repeating_group = filters::compile_repeating_group(&options.repeating_group_pattern)
            .map_err(|source| DiffError::Pattern {
                pattern: options.repeating_group_pattern.clone(),
                source,
            })?;
        let excluded: HashSet<String> = options.excluded_keys.into_iter().collect();
        Ok(Self {
            normalize: options.normalize,
            filters: filters::KeyFilters {
                repeating_group,
                excluded,
            },
        })
    }

    /// Changed fields in the edited record's key order. Keys missing from
    /// `original` have no prior value and are not reported.
    pub fn diff(
        &self,
        original: &RecordSnapshot,
        edited: &RecordSnapshot,
        descriptors: &DescriptorSet,
    ) -> Vec<ChangedField> {
        let mut changes = Vec::new();
        for (key, new_value) in edited.iter() {
            if self.filters.skips(key) {
                continue;
            }
            let Some(old_value) = original.get(key) else {
                continue;
            };
            let old_normalized = normalize::normalize(old_value, &self.normalize);
            let new_normalized = normalize::normalize(new_value, &self.normalize);
            if old_normalized == new_normalized {
                continue;
            }
            let (descriptor, descriptor_source) = descriptors.resolve(key);
            changes.push(ChangedField {
                key: key.clone(),
                old_value: old_value.clone(),
                new_value: new_value.clone(),
                old_normalized,
                new_normalized,
                descriptor,
                descriptor_source,
            });
        }
        changes
    }
}

impl Default for Differ {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            filters: filters::KeyFilters {
                repeating_group: filters::compile_repeating_group(DEFAULT_REPEATING_GROUP_PATTERN)
                    .ok()
                    .flatten(),
                excluded: HashSet::new(),
            },
        }
    }
}

/// [`Differ::diff`] with default options.
pub fn diff(
    original: &RecordSnapshot,
    edited: &RecordSnapshot,
    descriptors: &DescriptorSet,
) -> Vec<ChangedField> {
    Differ::default().diff(original, edited, descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DescriptorSource, FieldDescriptor, FieldType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn keys(changes: &[ChangedField]) -> Vec<&str> {
        changes.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn reports_only_normalized_differences_in_edited_order() {
        let original = RecordSnapshot::new()
            .with("weight", "70")
            .with("consent", true)
            .with("visit", "01/02/2024")
            .with("notes", "none");
        let edited = RecordSnapshot::new()
            .with("notes", "")
            .with("visit", "2024-02-01")
            .with("weight", "72")
            .with("consent", "0");
        let changes = diff(&original, &edited, &DescriptorSet::new());
        assert_eq!(keys(&changes), vec!["weight", "consent"]);
        assert_eq!(changes[1].old_normalized, "1");
        assert_eq!(changes[1].new_normalized, "0");
        assert_eq!(changes[1].new_value, json!("0"));
    }

    #[test]
    fn keys_missing_from_original_are_ignored() {
        let original = RecordSnapshot::new().with("a", "x");
        let edited = RecordSnapshot::new().with("a", "x").with("b", "new row");
        assert!(diff(&original, &edited, &DescriptorSet::new()).is_empty());
    }

    #[test]
    fn repeating_groups_are_never_reviewed() {
        let original = RecordSnapshot::new()
            .with("meds[0].dose", "5")
            .with("dose", "5");
        let edited = RecordSnapshot::new()
            .with("meds[0].dose", "10")
            .with("dose", "10");
        let changes = diff(&original, &edited, &DescriptorSet::new());
        assert_eq!(keys(&changes), vec!["dose"]);
    }

    #[test]
    fn custom_pattern_and_excluded_keys() {
        let differ = Differ::new(DiffOptions {
            repeating_group_pattern: r"^row_\d+_".to_string(),
            excluded_keys: vec!["csrf_token".to_string()],
            ..DiffOptions::default()
        })
        .unwrap();
        let original = RecordSnapshot::new()
            .with("row_1_value", "a")
            .with("csrf_token", "t1")
            .with("meds[0]", "x");
        let edited = RecordSnapshot::new()
            .with("row_1_value", "b")
            .with("csrf_token", "t2")
            .with("meds[0]", "y");
        let changes = differ.diff(&original, &edited, &DescriptorSet::new());
        assert_eq!(keys(&changes), vec!["meds[0]"]);
    }

    #[test]
    fn empty_pattern_disables_group_filter() {
        let differ = Differ::new(DiffOptions {
            repeating_group_pattern: "  ".to_string(),
            ..DiffOptions::default()
        })
        .unwrap();
        let original = RecordSnapshot::new().with("meds[0]", "x");
        let edited = RecordSnapshot::new().with("meds[0]", "y");
        assert_eq!(differ.diff(&original, &edited, &DescriptorSet::new()).len(), 1);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = Differ::new(DiffOptions {
            repeating_group_pattern: "[".to_string(),
            ..DiffOptions::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("invalid repeating-group pattern '['"));
    }

    #[test]
    fn descriptors_are_resolved_with_fallback() {
        let descriptors: DescriptorSet = vec![FieldDescriptor::new("a", "Alpha", FieldType::Select)]
            .into_iter()
            .collect();
        let original = RecordSnapshot::new().with("a", "1").with("b", "x");
        let edited = RecordSnapshot::new().with("a", "2").with("b", "y");
        let changes = diff(&original, &edited, &descriptors);
        assert_eq!(changes[0].label(), "Alpha");
        assert_eq!(changes[0].descriptor_source, DescriptorSource::Declared);
        assert_eq!(changes[1].label(), "b");
        assert_eq!(changes[1].descriptor.field_type, FieldType::Text);
        assert_eq!(changes[1].descriptor_source, DescriptorSource::Fallback);
    }
}
