//! Update plan types and range addressing.

use serde::Serialize;

/// One contiguous single-row range write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellUpdate {
    /// A1-notation range, e.g. `Tasks!B5:C5`.
    pub range: String,
    /// Cell values for the range, left to right.
    pub values: Vec<String>,
}

/// The ordered output of one reconciliation run.
///
/// Built once per run and applied as at most two API calls: one batch
/// update covering all `cell_updates`, one append for `append_rows`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePlan {
    /// Targeted range writes for matched or adopted rows.
    pub cell_updates: Vec<CellUpdate>,
    /// Whole new rows for tasks without any sheet counterpart.
    pub append_rows: Vec<Vec<String>>,
    /// Joined records skipped because no key could be determined.
    pub skipped_missing_key: usize,
}

impl UpdatePlan {
    /// True when the plan mutates nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell_updates.is_empty() && self.append_rows.is_empty()
    }
}

/// Column letter for a zero-based index. Single letter only; callers
/// validate indices against the header before building ranges.
#[must_use]
pub fn column_letter(index: usize) -> char {
    debug_assert!(index <= 25);
    (b'A' + u8::try_from(index.min(25)).unwrap_or(25)) as char
}

/// A1 range for a contiguous column span on one physical row.
#[must_use]
pub fn row_range(tab: &str, start_col: usize, end_col: usize, row: usize) -> String {
    format!(
        "{tab}!{}{row}:{}{row}",
        column_letter(start_col),
        column_letter(end_col)
    )
}
