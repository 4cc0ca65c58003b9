//! The reconciliation engine.
//!
//! This module is the core of the tool:
//!
//! - **Classify**: raw tracker status → Done/NotDone label
//! - **Table**: raw sheet cells → fixed-width snapshot
//! - **Schema**: declarative column mapping, resolved against the live header
//! - **Reconcile**: key join, field diff, title adoption, append
//! - **Plan**: the ordered cell updates and new rows for one run
//!
//! # Architecture
//!
//! The engine is a pure function of (tasks, sheet rows, schema,
//! done-set): it performs no I/O and holds no state between runs. The
//! tracker adapter and the sheet transport feed it and apply its plan.
//!
//! # Example
//!
//! ```ignore
//! use sheetsync::engine::{reconcile, DoneSet, SheetSchema, SheetTable};
//!
//! let schema = SheetSchema::build("Key", "Status", None, None, &[])?;
//! let done = DoneSet::parse("Done,Resolved");
//! let table = SheetTable::from_raw(raw_rows).expect("non-empty sheet");
//! let plan = reconcile(&schema, &table, &tasks, &done, "Tasks")?;
//! ```

mod classify;
mod plan;
mod reconcile;
mod schema;
mod table;

pub use classify::DoneSet;
pub use plan::{column_letter, row_range, CellUpdate, UpdatePlan};
pub use reconcile::{bootstrap_rows, join, reconcile, MatchRecord};
pub use schema::{ColumnSpec, FieldRole, ResolvedColumns, SheetSchema};
pub use table::SheetTable;
