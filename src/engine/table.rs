//! Sheet snapshot table.
//!
//! Turns the raw cell rows returned by the sheet API (first row =
//! header, rest = data) into a fixed-width table. Short rows are
//! right-padded to the header's width; no row is ever rejected.

/// An in-memory snapshot of the sheet's tracked tab.
#[derive(Debug, Clone)]
pub struct SheetTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Build a table from raw cell rows.
    ///
    /// Returns `None` for a sheet with zero rows (not even a header);
    /// callers take the bootstrap path instead of reconciling.
    #[must_use]
    pub fn from_raw(mut raw: Vec<Vec<String>>) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let header = raw.remove(0);
        let width = header.len();
        let rows = raw
            .into_iter()
            .map(|mut row| {
                row.truncate(width);
                row.resize(width, String::new());
                row
            })
            .collect();
        Some(Self { header, rows })
    }

    /// The header row.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows in table order, each exactly header-width.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Physical sheet row number for data row `index` (1-based; the
    /// header occupies physical row 1).
    #[must_use]
    pub fn physical_row(index: usize) -> usize {
        index + 2
    }
}
