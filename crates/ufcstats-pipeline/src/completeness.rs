//! Per-field completeness markers
//!
//! Every typed field carries one of three states. `Missing` means the source
//! itself said "unknown" (an empty cell or `--`), `Unparseable` means the
//! source gave a value we could not read. The two are never conflated: the
//! first is a property of the source site, the second is a property of our
//! parser or of a format change upstream.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::coerce::Coerced;

/// Completeness state of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// Present in the source and converted to its typed value
    Valid,
    /// Present in the source but did not match the expected format
    Unparseable,
    /// Explicitly marked unknown by the source
    Missing,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Valid => "valid",
            FieldStatus::Unparseable => "unparseable",
            FieldStatus::Missing => "missing",
        }
    }
}

impl std::fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of fields on one row that are not `Valid`.
///
/// Fields absent from the set are valid. Ordered by field name so the
/// rendered form is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletenessFlags {
    flags: BTreeMap<&'static str, FieldStatus>,
}

impl CompletenessFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the status of a field; valid fields leave no marker
    pub fn record(&mut self, field: &'static str, status: FieldStatus) {
        if status == FieldStatus::Valid {
            self.flags.remove(field);
        } else {
            self.flags.insert(field, status);
        }
    }

    pub fn status(&self, field: &str) -> FieldStatus {
        self.flags.get(field).copied().unwrap_or(FieldStatus::Valid)
    }

    pub fn is_complete(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn count(&self, status: FieldStatus) -> usize {
        self.flags.values().filter(|s| **s == status).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FieldStatus)> + '_ {
        self.flags.iter().map(|(k, v)| (*k, *v))
    }
}

/// `height=missing;reach=unparseable`, or the empty string for a complete row
impl std::fmt::Display for CompletenessFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (field, status)) in self.flags.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}={}", field, status)?;
        }
        Ok(())
    }
}

/// Anything that can report the status of each of its typed fields
pub trait Flagged {
    /// `(field name, status)` for every typed field, in column order
    fn field_statuses(&self) -> Vec<(&'static str, FieldStatus)>;

    fn completeness(&self) -> CompletenessFlags {
        CompletenessFlagger::flag(self.field_statuses())
    }
}

/// Builds the marker set for a row from its coercion outcomes
pub struct CompletenessFlagger;

impl CompletenessFlagger {
    pub fn flag<I>(statuses: I) -> CompletenessFlags
    where
        I: IntoIterator<Item = (&'static str, FieldStatus)>,
    {
        let mut flags = CompletenessFlags::new();
        for (field, status) in statuses {
            flags.record(field, status);
        }
        flags
    }
}

/// Pick the value to keep when a detail page and a directory page describe
/// the same field of the same entity.
///
/// A valid detail value wins. Otherwise a valid directory value is used.
/// When neither is valid the detail outcome is kept, so the marker reflects
/// the more specific page.
pub fn merge_field<T: Clone>(detail: &Coerced<T>, directory: &Coerced<T>) -> Coerced<T> {
    match (detail, directory) {
        (Coerced::Valid(_), _) => detail.clone(),
        (_, Coerced::Valid(_)) => directory.clone(),
        _ => detail.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_only_keep_non_valid_fields() {
        let flags = CompletenessFlagger::flag([
            ("reach", FieldStatus::Unparseable),
            ("height", FieldStatus::Missing),
            ("weight", FieldStatus::Valid),
        ]);

        assert!(!flags.is_complete());
        assert_eq!(flags.status("weight"), FieldStatus::Valid);
        assert_eq!(flags.status("height"), FieldStatus::Missing);
        assert_eq!(flags.count(FieldStatus::Unparseable), 1);
        assert_eq!(flags.to_string(), "height=missing;reach=unparseable");
    }

    #[test]
    fn test_complete_row_renders_empty() {
        let flags = CompletenessFlagger::flag([("height", FieldStatus::Valid)]);
        assert!(flags.is_complete());
        assert_eq!(flags.to_string(), "");
    }

    #[test]
    fn test_recording_valid_clears_marker() {
        let mut flags = CompletenessFlags::new();
        flags.record("dob", FieldStatus::Missing);
        flags.record("dob", FieldStatus::Valid);
        assert!(flags.is_complete());
    }

    #[test]
    fn test_merge_prefers_valid_detail() {
        let merged = merge_field(&Coerced::Valid("Jon"), &Coerced::Valid("Jonathan"));
        assert_eq!(merged, Coerced::Valid("Jon"));
    }

    #[test]
    fn test_merge_falls_back_to_valid_directory() {
        let merged = merge_field(&Coerced::Missing, &Coerced::Valid(73));
        assert_eq!(merged, Coerced::Valid(73));

        let merged = merge_field(&Coerced::Unparseable, &Coerced::Valid(73));
        assert_eq!(merged, Coerced::Valid(73));
    }

    #[test]
    fn test_merge_keeps_detail_status_when_neither_valid() {
        let merged: Coerced<i64> = merge_field(&Coerced::Unparseable, &Coerced::Missing);
        assert_eq!(merged, Coerced::Unparseable);

        let merged: Coerced<i64> = merge_field(&Coerced::Missing, &Coerced::Unparseable);
        assert_eq!(merged, Coerced::Missing);
    }
}
