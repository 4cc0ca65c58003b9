//! Sheet transport: snapshot read, batch update, append.
//!
//! Talks to the Google Sheets v4 values API with a pre-issued OAuth
//! bearer token. The engine never calls this directly; the run command
//! reads the snapshot here, hands rows to the engine, and applies the
//! resulting plan here.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::{CellUpdate, UpdatePlan};
use crate::error::{Error, Result};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Raw cell access to one spreadsheet tab.
///
/// The run command consumes this capability; tests stub it without HTTP.
pub trait SheetStore {
    /// Read a range; an empty vec means the range holds no values.
    fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>>;
    /// Apply all cell updates in one batched call.
    fn batch_update(&self, updates: &[CellUpdate]) -> Result<()>;
    /// Append whole rows after the last data row of the tab.
    fn append_rows(&self, rows: &[Vec<String>]) -> Result<()>;
}

/// Google Sheets values-API client over a blocking HTTP transport.
pub struct GoogleSheetsClient {
    client: reqwest::blocking::Client,
    spreadsheet_id: String,
    tab: String,
    token: String,
}

impl GoogleSheetsClient {
    #[must_use]
    pub fn new(spreadsheet_id: String, tab: String, token: String) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            spreadsheet_id,
            tab,
            token,
        }
    }
}

impl SheetStore for GoogleSheetsClient {
    fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = format!("{SHEETS_API}/{}/values/{range}", self.spreadsheet_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| Error::Sheet(format!("read failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Sheet(format!(
                "read returned HTTP {}",
                response.status()
            )));
        }

        let body: ValueRange = response
            .json()
            .map_err(|e| Error::Sheet(format!("failed to parse read response: {e}")))?;
        Ok(body.values.unwrap_or_default())
    }

    fn batch_update(&self, updates: &[CellUpdate]) -> Result<()> {
        let url = format!("{SHEETS_API}/{}/values:batchUpdate", self.spreadsheet_id);
        let body = BatchUpdateRequest {
            value_input_option: "RAW",
            data: updates
                .iter()
                .map(|u| ValueRangeData {
                    range: &u.range,
                    values: vec![&u.values],
                })
                .collect(),
        };
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| Error::Sheet(format!("batch update failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Sheet(format!(
                "batch update returned HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn append_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        let url = format!(
            "{SHEETS_API}/{}/values/{}!A1:append",
            self.spreadsheet_id, self.tab
        );
        let body = AppendRequest { values: rows };
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body)
            .send()
            .map_err(|e| Error::Sheet(format!("append failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Sheet(format!(
                "append returned HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Execute an update plan: one batch update call, one append call,
/// each skipped when its half of the plan is empty.
///
/// No retry, no rollback. A failed batch update is logged and the
/// append half is still attempted, matching the plan's per-call
/// atomicity; the first failure is returned once both halves ran.
/// Rerunning after a partial failure is safe because the diff only
/// emits updates for fields that still differ.
pub fn apply_plan(store: &dyn SheetStore, plan: &UpdatePlan) -> Result<()> {
    let mut first_error = None;

    if plan.cell_updates.is_empty() {
        info!("no cell updates needed");
    } else {
        info!(count = plan.cell_updates.len(), "sending batched cell updates");
        if let Err(e) = store.batch_update(&plan.cell_updates) {
            warn!("batch update failed: {e}");
            first_error = Some(e);
        }
    }

    if plan.append_rows.is_empty() {
        info!("no new rows to append");
    } else {
        info!(count = plan.append_rows.len(), "appending new rows");
        if let Err(e) = store.append_rows(&plan.append_rows) {
            warn!("append failed: {e}");
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

// ── Wire types ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ValueRange {
    values: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Serialize)]
struct BatchUpdateRequest<'a> {
    #[serde(rename = "valueInputOption")]
    value_input_option: &'static str,
    data: Vec<ValueRangeData<'a>>,
}

#[derive(Debug, Serialize)]
struct ValueRangeData<'a> {
    range: &'a str,
    values: Vec<&'a Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AppendRequest<'a> {
    values: &'a [Vec<String>],
}
