use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Checkbox,
    Select,
    Radio,
    Date,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Date => "date",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    /// Raw value to display label, consulted for select and radio fields.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, raw: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.insert(raw.into(), label.into());
        self
    }

    /// Descriptor used when a changed field was never declared.
    pub fn fallback(key: &str) -> Self {
        Self::new(key, key, FieldType::Text)
    }

    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorSource {
    Declared,
    Fallback,
}

#[derive(Clone, Debug, Default)]
pub struct DescriptorSet {
    by_key: HashMap<String, FieldDescriptor>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: FieldDescriptor) {
        self.by_key.insert(descriptor.key.clone(), descriptor);
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.by_key.get(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn resolve(&self, key: &str) -> (FieldDescriptor, DescriptorSource) {
        match self.by_key.get(key) {
            Some(d) => (d.clone(), DescriptorSource::Declared),
            None => (FieldDescriptor::fallback(key), DescriptorSource::Fallback),
        }
    }
}

impl FromIterator<FieldDescriptor> for DescriptorSet {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        let mut set = Self::new();
        for d in iter {
            set.insert(d);
        }
        set
    }
}

/// One form's field values, in the order the form declared them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSnapshot {
    values: Map<String, Value>,
}

impl RecordSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RecordSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (k, v) in iter {
            snapshot.insert(k, v);
        }
        snapshot
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangedField {
    pub key: String,
    pub old_value: Value,
    pub new_value: Value,
    pub old_normalized: String,
    pub new_normalized: String,
    pub descriptor: FieldDescriptor,
    pub descriptor_source: DescriptorSource,
}

impl ChangedField {
    pub fn label(&self) -> &str {
        self.descriptor.display_label()
    }
}

/// Changed-field key to justification, kept in changed-field order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReasonMap {
    entries: Map<String, Value>,
}

impl ReasonMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, reason: impl Into<String>) {
        self.entries
            .insert(key.into(), Value::String(reason.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str().unwrap_or_default()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A review request as handed over by the form layer: declared fields plus
/// the record before and after editing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChangeDocument {
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub original: RecordSnapshot,
    #[serde(default)]
    pub edited: RecordSnapshot,
}

impl ChangeDocument {
    /// Parses YAML or JSON (JSON is accepted as YAML).
    pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<ChangeDocument>(contents)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| DocumentError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn descriptors(&self) -> DescriptorSet {
        self.fields.iter().cloned().collect()
    }
}
