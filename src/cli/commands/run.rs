//! The run command: fetch, reconcile, apply.
//!
//! Phases run strictly in order — all tracker pages are fetched before
//! reconciliation starts, and the whole plan is built before any
//! mutation is sent. The sheet is a shared mutable resource with no
//! locking; concurrent runs against the same tab must be serialized
//! externally.

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::cli::Cli;
use crate::config::Config;
use crate::engine::{bootstrap_rows, reconcile, SheetTable, UpdatePlan};
use crate::error::Result;
use crate::jira::{JiraClient, TaskSource};
use crate::sheets::{apply_plan, GoogleSheetsClient, SheetStore};

/// Outcome of one reconciliation run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Tasks fetched from the tracker.
    pub tasks: usize,
    /// Data rows read from the sheet (0 on the bootstrap path).
    pub rows: usize,
    /// First-time fill of an empty sheet (header + all tasks appended).
    pub bootstrap: bool,
    /// The computed plan; on the bootstrap path `append_rows` holds the
    /// header row followed by the task rows.
    pub plan: UpdatePlan,
    /// False when `--dry-run` skipped the mutation phase.
    pub applied: bool,
}

/// Execute the run (or plan) command.
pub fn execute(cli: &Cli, dry_run: bool, json: bool) -> Result<()> {
    let config = Config::from_cli(cli)?;
    let source = JiraClient::new(
        config.jira.base_url.clone(),
        config.jira.email.clone(),
        config.jira.api_token.clone(),
        config.jira.jql.clone(),
        config.jira.page_size,
    );
    let store = GoogleSheetsClient::new(
        config.sheet.spreadsheet_id.clone(),
        config.sheet.tab.clone(),
        config.sheet.token.clone(),
    );

    let report = run_sync(&config, &source, &store, dry_run)?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else if !cli.quiet {
        print_report(&report, dry_run);
    }
    Ok(())
}

/// Fetch tasks, reconcile against the sheet snapshot, and apply the
/// plan unless `dry_run` is set.
pub fn run_sync(
    config: &Config,
    source: &dyn TaskSource,
    store: &dyn SheetStore,
    dry_run: bool,
) -> Result<RunReport> {
    let tasks = source.fetch_tasks()?;
    if tasks.is_empty() {
        info!("no tracker tasks matched the query; nothing to reconcile");
        return Ok(RunReport {
            tasks: 0,
            rows: 0,
            bootstrap: false,
            plan: UpdatePlan::default(),
            applied: false,
        });
    }

    let raw = store.read_range(&snapshot_range(&config.sheet.tab))?;
    let Some(table) = SheetTable::from_raw(raw) else {
        // Empty sheet: first-time bulk append of header + all tasks,
        // no reconciliation.
        info!("sheet is empty; appending header and all tasks");
        let rows = bootstrap_rows(&config.schema, &tasks, &config.done);
        let plan = UpdatePlan {
            append_rows: rows,
            ..UpdatePlan::default()
        };
        if !dry_run {
            store.append_rows(&plan.append_rows)?;
        }
        return Ok(RunReport {
            tasks: tasks.len(),
            rows: 0,
            bootstrap: true,
            plan,
            applied: !dry_run,
        });
    };

    let row_count = table.rows().len();
    info!(rows = row_count, "sheet snapshot loaded");
    let plan = reconcile(&config.schema, &table, &tasks, &config.done, &config.sheet.tab)?;

    if !dry_run {
        apply_plan(store, &plan)?;
    }

    Ok(RunReport {
        tasks: tasks.len(),
        rows: row_count,
        bootstrap: false,
        plan,
        applied: !dry_run,
    })
}

fn snapshot_range(tab: &str) -> String {
    format!("{tab}!A:Z")
}

fn print_report(report: &RunReport, dry_run: bool) {
    if report.tasks == 0 {
        println!("{}", "No tracker tasks matched the query.".dimmed());
        return;
    }

    if report.bootstrap {
        let data_rows = report.plan.append_rows.len().saturating_sub(1);
        if dry_run {
            println!(
                "{} empty sheet; would append the header and {data_rows} task rows",
                "Bootstrap:".yellow().bold()
            );
        } else {
            println!(
                "{} empty sheet filled with the header and {data_rows} task rows",
                "Bootstrap:".green().bold()
            );
        }
        return;
    }

    println!(
        "Reconciled {} tasks against {} sheet rows",
        report.tasks, report.rows
    );

    if report.plan.is_empty() {
        println!("{}", "Sheet is already up to date.".green());
    } else {
        if !report.plan.cell_updates.is_empty() {
            println!("  Updates: {}", report.plan.cell_updates.len());
            for update in &report.plan.cell_updates {
                println!("    {} <- {:?}", update.range, update.values);
            }
        }
        if !report.plan.append_rows.is_empty() {
            println!("  New rows: {}", report.plan.append_rows.len());
            for row in &report.plan.append_rows {
                println!("    {row:?}");
            }
        }
        if dry_run {
            println!("{}", "Dry run: nothing was written.".yellow());
        } else {
            println!("{}", "Plan applied.".green());
        }
    }

    if report.plan.skipped_missing_key > 0 {
        println!(
            "{} {} record(s) with no determinable key.",
            "Skipped".yellow(),
            report.plan.skipped_missing_key
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CellUpdate, DoneSet, SheetSchema};
    use crate::model::Task;
    use std::cell::RefCell;

    struct StubSource {
        tasks: Vec<Task>,
    }

    impl TaskSource for StubSource {
        fn fetch_tasks(&self) -> Result<Vec<Task>> {
            Ok(self.tasks.clone())
        }
    }

    #[derive(Default)]
    struct StubStore {
        raw: Vec<Vec<String>>,
        updates: RefCell<Vec<CellUpdate>>,
        appended: RefCell<Vec<Vec<String>>>,
    }

    impl SheetStore for StubStore {
        fn read_range(&self, _range: &str) -> Result<Vec<Vec<String>>> {
            Ok(self.raw.clone())
        }

        fn batch_update(&self, updates: &[CellUpdate]) -> Result<()> {
            self.updates.borrow_mut().extend_from_slice(updates);
            Ok(())
        }

        fn append_rows(&self, rows: &[Vec<String>]) -> Result<()> {
            self.appended.borrow_mut().extend_from_slice(rows);
            Ok(())
        }
    }

    fn config() -> Config {
        Config {
            jira: crate::config::JiraConfig {
                base_url: "https://example.atlassian.net".into(),
                email: "a@example.com".into(),
                api_token: "token".into(),
                jql: "project = KAN".into(),
                page_size: 100,
            },
            sheet: crate::config::SheetConfig {
                spreadsheet_id: "sheet-id".into(),
                tab: "Tasks".into(),
                token: "token".into(),
            },
            schema: SheetSchema::build("Key", "Status", None, None, &[]).unwrap(),
            done: DoneSet::parse("Done"),
        }
    }

    fn task(key: &str, status: &str) -> Task {
        Task {
            key: key.into(),
            title: String::new(),
            raw_status: status.into(),
            resolution_date: String::new(),
            extra: Vec::new(),
        }
    }

    fn raw(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| (*c).to_string()).collect())
            .collect()
    }

    #[test]
    fn test_bootstrap_on_empty_sheet() {
        let source = StubSource {
            tasks: vec![task("KAN-1", "Done"), task("KAN-2", "To Do")],
        };
        let store = StubStore::default();

        let report = run_sync(&config(), &source, &store, false).unwrap();

        assert!(report.bootstrap);
        assert!(report.applied);
        let appended = store.appended.borrow();
        assert_eq!(
            *appended,
            vec![
                vec!["Key".to_string(), "Status".to_string()],
                vec!["KAN-1".to_string(), "Done".to_string()],
                vec!["KAN-2".to_string(), "NotDone".to_string()],
            ]
        );
        assert!(store.updates.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let source = StubSource {
            tasks: vec![task("KAN-1", "Done")],
        };
        let store = StubStore {
            raw: raw(&[&["Key", "Status"], &["KAN-1", "NotDone"]]),
            ..StubStore::default()
        };

        let report = run_sync(&config(), &source, &store, true).unwrap();

        assert!(!report.applied);
        assert_eq!(report.plan.cell_updates.len(), 1);
        assert!(store.updates.borrow().is_empty());
        assert!(store.appended.borrow().is_empty());
    }

    #[test]
    fn test_run_applies_updates_and_appends() {
        let source = StubSource {
            tasks: vec![task("KAN-1", "Done"), task("KAN-9", "To Do")],
        };
        let store = StubStore {
            raw: raw(&[&["Key", "Status"], &["KAN-1", "NotDone"]]),
            ..StubStore::default()
        };

        let report = run_sync(&config(), &source, &store, false).unwrap();

        assert!(report.applied);
        assert_eq!(report.rows, 1);
        assert_eq!(store.updates.borrow().len(), 1);
        assert_eq!(store.updates.borrow()[0].range, "Tasks!B2:B2");
        assert_eq!(
            *store.appended.borrow(),
            vec![vec!["KAN-9".to_string(), "NotDone".to_string()]]
        );
    }

    #[test]
    fn test_no_tasks_short_circuits() {
        let source = StubSource { tasks: Vec::new() };
        let store = StubStore {
            raw: raw(&[&["Key", "Status"]]),
            ..StubStore::default()
        };

        let report = run_sync(&config(), &source, &store, false).unwrap();

        assert_eq!(report.tasks, 0);
        assert!(report.plan.is_empty());
        assert!(store.updates.borrow().is_empty());
        assert!(store.appended.borrow().is_empty());
    }
}
