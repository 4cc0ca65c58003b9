//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod commands;

/// sheetsync - one-way Jira-to-Google-Sheets task reconciliation
#[derive(Parser, Debug)]
#[command(name = "sheetsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Jira base URL, e.g. https://example.atlassian.net
    #[arg(long, global = true, env = "JIRA_URL")]
    pub jira_url: Option<String>,

    /// Jira account email for basic auth
    #[arg(long, global = true, env = "JIRA_EMAIL")]
    pub jira_email: Option<String>,

    /// Jira API token for basic auth
    #[arg(long, global = true, env = "JIRA_API_TOKEN", hide_env_values = true)]
    pub jira_token: Option<String>,

    /// JQL query selecting the tasks to mirror
    #[arg(long, global = true, env = "JIRA_JQL")]
    pub jql: Option<String>,

    /// Tracker search page size
    #[arg(long, global = true, env = "JIRA_PAGE_SIZE", default_value_t = 100)]
    pub page_size: usize,

    /// Spreadsheet ID
    #[arg(long, global = true, env = "SHEET_ID")]
    pub sheet_id: Option<String>,

    /// Tab (sheet) name within the spreadsheet
    #[arg(long, global = true, env = "SHEET_TAB")]
    pub sheet_tab: Option<String>,

    /// OAuth bearer token with spreadsheets scope
    #[arg(long, global = true, env = "SHEETS_TOKEN", hide_env_values = true)]
    pub sheets_token: Option<String>,

    /// Header name of the task key column
    #[arg(long, global = true, env = "SHEET_KEY_COLUMN", default_value = "Key")]
    pub key_column: String,

    /// Header name of the status column
    #[arg(long, global = true, env = "SHEET_STATUS_COLUMN", default_value = "Status")]
    pub status_column: String,

    /// Header name of the title column (enables title tracking and adoption)
    #[arg(long, global = true, env = "SHEET_TITLE_COLUMN")]
    pub title_column: Option<String>,

    /// Header name of the resolution date column
    #[arg(long, global = true, env = "SHEET_RESOLUTION_COLUMN")]
    pub resolution_column: Option<String>,

    /// Passthrough columns as Header=field pairs (fields: assignee, project)
    #[arg(long, global = true, env = "SHEET_EXTRA_COLUMNS")]
    pub extra_columns: Option<String>,

    /// Comma-separated tracker statuses that count as done
    #[arg(long, global = true, env = "DONE_STATUS_LIST", default_value = "Done")]
    pub done_statuses: String,

    /// Output as JSON (for agent integration)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch tracker tasks, reconcile against the sheet, apply the plan
    Run {
        /// Compute and print the plan without writing to the sheet
        #[arg(long)]
        dry_run: bool,
    },

    /// Compute and print the update plan without applying it
    Plan,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_dry_run_flag_parses() {
        let cli = Cli::try_parse_from(["sheetsync", "run", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { dry_run: true }));
    }

    #[test]
    fn test_column_flags_default() {
        let cli = Cli::try_parse_from(["sheetsync", "plan"]).unwrap();
        assert_eq!(cli.key_column, "Key");
        assert_eq!(cli.status_column, "Status");
        assert_eq!(cli.done_statuses, "Done");
        assert_eq!(cli.page_size, 100);
    }
}
