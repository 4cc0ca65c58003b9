//! The reconciliation engine.
//!
//! Joins tracker tasks against sheet rows by key, diffs tracked
//! fields, adopts key-less rows by title, and produces the
//! [`UpdatePlan`] for one run. Pure: the same (tasks, rows, schema)
//! input always yields the same plan. Processing order is fixed —
//! sheet rows in table order first, then unmatched tasks in fetch
//! order — and the first candidate wins on every tie.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::engine::classify::DoneSet;
use crate::engine::plan::{row_range, CellUpdate, UpdatePlan};
use crate::engine::schema::{ResolvedColumns, SheetSchema};
use crate::engine::table::SheetTable;
use crate::error::Result;
use crate::model::{DoneLabel, Task};

/// Outcome of pairing one task with zero-or-one sheet row.
///
/// The three kinds partition the full outer join over key values.
/// `TaskOnly` is provisional: the plan step may still adopt a key-less
/// row by title before falling back to an append.
#[derive(Debug, PartialEq, Eq)]
pub enum MatchRecord<'a> {
    Matched { task: &'a Task, row_index: usize },
    TaskOnly { task: &'a Task },
    RowOnly { row_index: usize },
}

/// Full outer join between sheet rows (left, keyed by the key column)
/// and tasks (right, keyed by `key`).
///
/// Rows come out in table order, then leftover tasks in input order.
/// When the same key appears in several rows only the first row is
/// matched; later duplicates become `RowOnly` and are never updated.
/// When the tracker repeats a key only the first task is kept.
/// Tasks with an empty key are dropped with a warning and counted.
pub fn join<'a>(
    table: &SheetTable,
    tasks: &'a [Task],
    resolved: &ResolvedColumns,
) -> (Vec<MatchRecord<'a>>, usize) {
    let mut skipped = 0usize;
    let mut by_key: HashMap<&str, &Task> = HashMap::new();
    let mut task_order: Vec<&Task> = Vec::new();
    for task in tasks {
        if task.key.is_empty() {
            warn!("task with empty key skipped");
            skipped += 1;
            continue;
        }
        // First occurrence wins if the tracker ever repeats a key;
        // later occurrences produce no record at all.
        match by_key.entry(task.key.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(task);
                task_order.push(task);
            }
            Entry::Occupied(_) => {
                warn!(key = %task.key, "duplicate task key ignored");
            }
        }
    }

    let mut consumed: HashMap<&str, ()> = HashMap::new();
    let mut records = Vec::new();
    for (row_index, row) in table.rows().iter().enumerate() {
        let row_key = row[resolved.key].as_str();
        if !row_key.is_empty() && consumed.contains_key(row_key) {
            debug!(key = row_key, row = row_index, "duplicate key row left stale");
            records.push(MatchRecord::RowOnly { row_index });
            continue;
        }
        match by_key.get(row_key).copied() {
            Some(task) if !row_key.is_empty() => {
                consumed.insert(row_key, ());
                records.push(MatchRecord::Matched { task, row_index });
            }
            _ => records.push(MatchRecord::RowOnly { row_index }),
        }
    }

    for task in task_order {
        if !consumed.contains_key(task.key.as_str()) {
            records.push(MatchRecord::TaskOnly { task });
        }
    }

    (records, skipped)
}

/// Reconcile tasks against the sheet snapshot and build the plan.
///
/// `tab` names the sheet tab for range addressing. Fails fast (before
/// any mutation) if the schema does not resolve against the header.
pub fn reconcile(
    schema: &SheetSchema,
    table: &SheetTable,
    tasks: &[Task],
    done: &DoneSet,
    tab: &str,
) -> Result<UpdatePlan> {
    let resolved = schema.resolve(table.header())?;
    let (records, skipped_missing_key) = join(table, tasks, &resolved);

    let mut plan = UpdatePlan {
        skipped_missing_key,
        ..UpdatePlan::default()
    };
    // Rows claimed by the key join or an earlier adoption; adoption
    // never rebinds a claimed row.
    let mut claimed = vec![false; table.rows().len()];
    for record in &records {
        if let MatchRecord::Matched { row_index, .. } = record {
            claimed[*row_index] = true;
        }
    }

    for record in &records {
        match record {
            MatchRecord::Matched { task, row_index } => {
                let label = done.classify(&task.raw_status);
                if let Some(update) =
                    diff_row(&resolved, table.rows()[*row_index].as_slice(), task, label, *row_index, tab)
                {
                    debug!(key = %task.key, range = %update.range, "row update");
                    plan.cell_updates.push(update);
                }
            }
            MatchRecord::TaskOnly { task } => {
                let label = done.classify(&task.raw_status);
                match find_adoption_row(&resolved, table, &claimed, task) {
                    Some(row_index) => {
                        claimed[row_index] = true;
                        let update =
                            adoption_update(&resolved, table.rows()[row_index].as_slice(), task, label, row_index, tab);
                        debug!(key = %task.key, range = %update.range, "adopting row by title");
                        plan.cell_updates.push(update);
                    }
                    None => {
                        debug!(key = %task.key, "new task appended");
                        plan.append_rows.push(append_row(&resolved, task, label));
                    }
                }
            }
            // One-directional policy: rows the engine does not own are
            // silently preserved.
            MatchRecord::RowOnly { .. } => {}
        }
    }

    Ok(plan)
}

/// Header plus one row per task, in the schema's canonical column
/// order. Used when the sheet is completely empty (not even a header).
#[must_use]
pub fn bootstrap_rows(schema: &SheetSchema, tasks: &[Task], done: &DoneSet) -> Vec<Vec<String>> {
    let mut rows = vec![schema.bootstrap_header()];
    for task in tasks {
        if task.key.is_empty() {
            warn!("task with empty key skipped");
            continue;
        }
        rows.push(schema.bootstrap_row(task, done.classify(&task.raw_status)));
    }
    rows
}

/// Target value for a tracked (non-key) column index, if that index is
/// tracked at all.
fn tracked_target(
    resolved: &ResolvedColumns,
    index: usize,
    task: &Task,
    label: DoneLabel,
) -> Option<String> {
    if index == resolved.status {
        Some(label.as_str().to_string())
    } else if resolved.title == Some(index) {
        Some(task.title.clone())
    } else if resolved.resolution == Some(index) {
        Some(task.resolution_date.clone())
    } else {
        None
    }
}

/// Build one contiguous range write over `span`, taking target values
/// for written columns and the row's current cells for the untracked
/// columns in between.
fn span_update(
    row: &[String],
    span: (usize, usize),
    row_index: usize,
    tab: &str,
    mut value_at: impl FnMut(usize) -> Option<String>,
) -> CellUpdate {
    let (start, end) = span;
    let values = (start..=end)
        .map(|i| value_at(i).unwrap_or_else(|| row[i].clone()))
        .collect();
    CellUpdate {
        range: row_range(tab, start, end, SheetTable::physical_row(row_index)),
        values,
    }
}

/// Field diff for a matched row. Emits one range write covering the
/// contiguous span of tracked columns if any tracked field differs;
/// unchanged rows produce nothing.
fn diff_row(
    resolved: &ResolvedColumns,
    row: &[String],
    task: &Task,
    label: DoneLabel,
    row_index: usize,
    tab: &str,
) -> Option<CellUpdate> {
    let tracked = resolved.tracked();
    let differs = tracked.iter().any(|&i| {
        tracked_target(resolved, i, task, label).is_some_and(|target| target != row[i])
    });
    if !differs {
        return None;
    }

    // The status column is always tracked, so the span is never empty.
    let start = tracked.iter().copied().fold(resolved.status, usize::min);
    let end = tracked.iter().copied().fold(resolved.status, usize::max);
    Some(span_update(row, (start, end), row_index, tab, |i| {
        tracked_target(resolved, i, task, label)
    }))
}

/// First unclaimed row (table order) whose title cell equals the
/// task's title, case-folded and trimmed. The key cell of such a row
/// is empty or different by construction — rows matching this task's
/// key were claimed by the join.
fn find_adoption_row(
    resolved: &ResolvedColumns,
    table: &SheetTable,
    claimed: &[bool],
    task: &Task,
) -> Option<usize> {
    let title_col = resolved.title?;
    let wanted = task.title.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    table.rows().iter().enumerate().find_map(|(i, row)| {
        (!claimed[i] && row[title_col].trim().to_lowercase() == wanted).then_some(i)
    })
}

/// Range write binding an adopted row to its task: key, title, status
/// and resolution date (where mapped) in one span.
fn adoption_update(
    resolved: &ResolvedColumns,
    row: &[String],
    task: &Task,
    label: DoneLabel,
    row_index: usize,
    tab: &str,
) -> CellUpdate {
    let written = resolved.tracked();
    let start = written.iter().copied().fold(resolved.key, usize::min);
    let end = written.iter().copied().fold(resolved.key, usize::max);
    span_update(row, (start, end), row_index, tab, |i| {
        if i == resolved.key {
            Some(task.key.clone())
        } else {
            tracked_target(resolved, i, task, label)
        }
    })
}

/// Full-width append row with every mapped field placed at its
/// resolved header position.
fn append_row(resolved: &ResolvedColumns, task: &Task, label: DoneLabel) -> Vec<String> {
    let mut row = vec![String::new(); resolved.width];
    row[resolved.key] = task.key.clone();
    row[resolved.status] = label.as_str().to_string();
    if let Some(i) = resolved.title {
        row[i] = task.title.clone();
    }
    if let Some(i) = resolved.resolution {
        row[i] = task.resolution_date.clone();
    }
    for (field, i) in &resolved.extras {
        row[*i] = task.extra_field(field).unwrap_or_default().to_string();
    }
    row
}
