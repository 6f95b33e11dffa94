use std::collections::HashSet;

use regex::Regex;

/// Keys of the form `medications[0].dose`.
pub const DEFAULT_REPEATING_GROUP_PATTERN: &str = r"\[\d+\]";

#[derive(Clone, Debug)]
pub(in crate::differ) struct KeyFilters {
    pub(in crate::differ) repeating_group: Option<Regex>,
    pub(in crate::differ) excluded: HashSet<String>,
}

impl KeyFilters {
    pub(in crate::differ) fn skips(&self, key: &str) -> bool {
        if self.excluded.contains(key) {
            return true;
        }
        if let Some(re) = self.repeating_group.as_ref() {
            if re.is_match(key) {
                return true;
            }
        }
        false
    }
}

pub(in crate::differ) fn compile_repeating_group(pattern: &str) -> Result<Option<Regex>, regex::Error> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Regex::new(trimmed).map(Some)
}
