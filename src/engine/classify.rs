//! Status classification.
//!
//! Maps a raw tracker status name to the binary [`DoneLabel`] written
//! into the sheet, given the configured set of "done" status names.

use std::collections::HashSet;

use crate::model::DoneLabel;

/// The set of tracker status names that count as completed.
///
/// Built once per run from a comma-separated configuration list.
/// Membership is case-insensitive: entries are trimmed and upper-cased
/// at parse time and raw statuses are upper-cased at lookup time.
#[derive(Debug, Clone)]
pub struct DoneSet {
    entries: HashSet<String>,
}

impl DoneSet {
    /// Parse a comma-separated list of status names.
    ///
    /// Empty entries are dropped; an entirely empty list falls back to
    /// the single entry `DONE`.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        let mut entries: HashSet<String> = list
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if entries.is_empty() {
            entries.insert("DONE".to_string());
        }
        Self { entries }
    }

    /// Classify a raw status name. Total: always returns one of the
    /// two labels.
    #[must_use]
    pub fn classify(&self, raw_status: &str) -> DoneLabel {
        if self.entries.contains(&raw_status.trim().to_uppercase()) {
            DoneLabel::Done
        } else {
            DoneLabel::NotDone
        }
    }
}
