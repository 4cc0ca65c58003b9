//! Declarative sheet schema.
//!
//! A [`SheetSchema`] names the columns the engine owns and the role
//! each one plays. One schema object covers every deployment layout
//! (minimal key+status, with title, with resolution date, with
//! passthrough columns) instead of separate code paths per layout.

use crate::error::{Error, Result};
use crate::model::{DoneLabel, Task};

/// Highest column index addressable with a single letter (`Z`).
const MAX_COLUMN_INDEX: usize = 25;

/// The role a mapped column plays during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRole {
    /// Task key; the join column. Written on adoption and append only.
    Key,
    /// Task title; tracked in diffs when mapped.
    Title,
    /// Done/NotDone label; always tracked.
    Status,
    /// Resolution date; tracked in diffs when mapped.
    ResolutionDate,
    /// Passthrough tracker field (e.g. `assignee`); append only.
    Extra(String),
}

/// One mapped column: the header cell text and its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub header: String,
    pub role: FieldRole,
}

/// The configured logical-to-physical column mapping.
///
/// Columns are kept in canonical order (key, title, status, resolution
/// date, extras); the bootstrap header row uses this order. Against a
/// live sheet the columns are located by header name, so the physical
/// order of an existing sheet does not have to match.
#[derive(Debug, Clone)]
pub struct SheetSchema {
    columns: Vec<ColumnSpec>,
}

impl SheetSchema {
    /// Build a schema from configured column names.
    ///
    /// `extras` maps a header name to a tracker field name; only
    /// `assignee` and `project` are known tracker fields.
    pub fn build(
        key_column: &str,
        status_column: &str,
        title_column: Option<&str>,
        resolution_column: Option<&str>,
        extras: &[(String, String)],
    ) -> Result<Self> {
        if key_column.trim().is_empty() {
            return Err(Error::Config("key column name must not be empty".into()));
        }
        if status_column.trim().is_empty() {
            return Err(Error::Config("status column name must not be empty".into()));
        }

        let mut columns = vec![ColumnSpec {
            header: key_column.to_string(),
            role: FieldRole::Key,
        }];
        if let Some(title) = title_column {
            columns.push(ColumnSpec {
                header: title.to_string(),
                role: FieldRole::Title,
            });
        }
        columns.push(ColumnSpec {
            header: status_column.to_string(),
            role: FieldRole::Status,
        });
        if let Some(resolution) = resolution_column {
            columns.push(ColumnSpec {
                header: resolution.to_string(),
                role: FieldRole::ResolutionDate,
            });
        }
        for (header, field) in extras {
            if field != "assignee" && field != "project" {
                return Err(Error::Config(format!(
                    "unknown tracker field '{field}' for extra column '{header}' \
                     (known fields: assignee, project)"
                )));
            }
            columns.push(ColumnSpec {
                header: header.clone(),
                role: FieldRole::Extra(field.clone()),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for col in &columns {
            if !seen.insert(col.header.as_str()) {
                return Err(Error::Config(format!(
                    "column '{}' is mapped more than once",
                    col.header
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Mapped columns in canonical order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Header row for a first-time bootstrap append.
    #[must_use]
    pub fn bootstrap_header(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header.clone()).collect()
    }

    /// Data row for a task in canonical column order.
    #[must_use]
    pub fn bootstrap_row(&self, task: &Task, label: DoneLabel) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| target_value(&c.role, task, label))
            .collect()
    }

    /// Locate the mapped columns in a live header row.
    ///
    /// Key and status columns must exist or the run fails before any
    /// mutation. Optional mapped columns missing from the header are
    /// dropped from tracking with a warning. Any resolved index beyond
    /// column `Z` is rejected: range addressing is single-letter only.
    pub fn resolve(&self, header: &[String]) -> Result<ResolvedColumns> {
        let find = |name: &str| header.iter().position(|h| h == name);

        let mut resolved = ResolvedColumns {
            key: 0,
            status: 0,
            title: None,
            resolution: None,
            extras: Vec::new(),
            width: header.len(),
        };

        for col in &self.columns {
            let index = match (find(&col.header), &col.role) {
                (Some(i), _) => i,
                (None, FieldRole::Key | FieldRole::Status) => {
                    return Err(Error::SchemaMismatch {
                        column: col.header.clone(),
                    });
                }
                (None, _) => {
                    tracing::warn!(
                        column = %col.header,
                        "mapped column not present in sheet header; field not tracked"
                    );
                    continue;
                }
            };
            if index > MAX_COLUMN_INDEX {
                return Err(Error::SheetTooWide {
                    column: col.header.clone(),
                    index,
                });
            }
            match &col.role {
                FieldRole::Key => resolved.key = index,
                FieldRole::Title => resolved.title = Some(index),
                FieldRole::Status => resolved.status = index,
                FieldRole::ResolutionDate => resolved.resolution = Some(index),
                FieldRole::Extra(field) => resolved.extras.push((field.clone(), index)),
            }
        }

        Ok(resolved)
    }
}

/// The target cell value a task produces for a column role.
#[must_use]
pub fn target_value(role: &FieldRole, task: &Task, label: DoneLabel) -> String {
    match role {
        FieldRole::Key => task.key.clone(),
        FieldRole::Title => task.title.clone(),
        FieldRole::Status => label.as_str().to_string(),
        FieldRole::ResolutionDate => task.resolution_date.clone(),
        FieldRole::Extra(field) => task.extra_field(field).unwrap_or_default().to_string(),
    }
}

/// Column indices of the mapped roles within a concrete header row.
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    pub key: usize,
    pub status: usize,
    pub title: Option<usize>,
    pub resolution: Option<usize>,
    /// (tracker field name, column index) for passthrough columns.
    pub extras: Vec<(String, usize)>,
    /// Width of the header row; appended rows are padded to it.
    pub width: usize,
}

impl ResolvedColumns {
    /// Indices of the columns compared in a field diff, in no
    /// particular order. The key column is matched, not diffed.
    #[must_use]
    pub fn tracked(&self) -> Vec<usize> {
        let mut cols = vec![self.status];
        if let Some(i) = self.title {
            cols.push(i);
        }
        if let Some(i) = self.resolution {
            cols.push(i);
        }
        cols
    }
}
