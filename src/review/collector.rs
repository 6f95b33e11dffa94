use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use crate::model::ReasonMap;
use crate::present::ReviewRow;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("missing reason for {}", .invalid_keys.join(", "))]
pub struct ValidationError {
    /// Keys of the rows without a reason, in row order.
    pub invalid_keys: Vec<String>,
}

/// Checks every row and builds the reason map. All blank rows are reported
/// at once.
pub fn collect(rows: &[ReviewRow]) -> Result<ReasonMap, ValidationError> {
    let mut reasons = ReasonMap::new();
    let mut invalid_keys = Vec::new();
    for row in rows {
        let reason = row.reason.trim();
        if reason.is_empty() {
            invalid_keys.push(row.key.clone());
        } else {
            reasons.insert(row.key.clone(), reason);
        }
    }
    if invalid_keys.is_empty() {
        Ok(reasons)
    } else {
        Err(ValidationError { invalid_keys })
    }
}

/// `"label: reason | label: reason"` in row order.
pub fn summarize(rows: &[ReviewRow], reasons: &ReasonMap) -> String {
    rows.iter()
        .filter_map(|row| {
            reasons
                .get(&row.key)
                .map(|reason| format!("{}: {}", row.label, reason))
        })
        .join(" | ")
}

/// What the caller attaches to the save request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub reason_map: ReasonMap,
    pub human_readable_summary: String,
}
