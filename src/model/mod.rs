//! Data types shared between the tracker adapter and the engine.

use serde::Serialize;

/// A task fetched from the issue tracker.
///
/// Field values are kept as the tracker returned them; the engine
/// compares cell contents with exact string equality, so no
/// normalization happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Stable unique identifier (e.g. `KAN-12`). Required; tasks with
    /// an empty key are skipped with a warning during reconciliation.
    pub key: String,
    /// Summary / title of the task.
    pub title: String,
    /// Raw status name as reported by the tracker.
    pub raw_status: String,
    /// Resolution date string; empty means unresolved.
    pub resolution_date: String,
    /// Passthrough fields (name, value) in a fixed order, e.g.
    /// `("assignee", "Jo Doe")`, `("project", "Kanban")`. Only written
    /// to columns the schema maps them to.
    pub extra: Vec<(String, String)>,
}

impl Task {
    /// Look up a passthrough field value by name.
    #[must_use]
    pub fn extra_field(&self, name: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Binary completion outcome written verbatim into the status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoneLabel {
    Done,
    NotDone,
}

impl DoneLabel {
    /// The literal cell value for this label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Done => "Done",
            Self::NotDone => "NotDone",
        }
    }
}

impl std::fmt::Display for DoneLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
