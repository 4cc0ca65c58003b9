//! Configuration management.
//!
//! All configuration is read once at startup from CLI flags and their
//! backing environment variables into an immutable [`Config`] value
//! that is passed explicitly into every component; nothing reads
//! ambient globals after this point, so the engine stays a pure
//! function of (tasks, sheet rows, config).

use crate::cli::Cli;
use crate::engine::{DoneSet, SheetSchema};
use crate::error::{Error, Result};

/// Tracker connection and query settings.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub jql: String,
    pub page_size: usize,
}

/// Sheet identity and credentials.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    pub tab: String,
    pub token: String,
}

/// The complete, validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub jira: JiraConfig,
    pub sheet: SheetConfig,
    pub schema: SheetSchema,
    pub done: DoneSet,
}

impl Config {
    /// Assemble and validate the configuration from parsed CLI flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let jira = JiraConfig {
            base_url: require(cli.jira_url.as_deref(), "JIRA_URL / --jira-url")?,
            email: require(cli.jira_email.as_deref(), "JIRA_EMAIL / --jira-email")?,
            api_token: require(cli.jira_token.as_deref(), "JIRA_API_TOKEN / --jira-token")?,
            jql: require(cli.jql.as_deref(), "JIRA_JQL / --jql")?,
            page_size: cli.page_size,
        };
        if jira.page_size == 0 {
            return Err(Error::Config("JIRA_PAGE_SIZE must be at least 1".into()));
        }

        let sheet = SheetConfig {
            spreadsheet_id: require(cli.sheet_id.as_deref(), "SHEET_ID / --sheet-id")?,
            tab: require(cli.sheet_tab.as_deref(), "SHEET_TAB / --sheet-tab")?,
            token: require(cli.sheets_token.as_deref(), "SHEETS_TOKEN / --sheets-token")?,
        };

        let extras = parse_extra_columns(cli.extra_columns.as_deref())?;
        let schema = SheetSchema::build(
            &cli.key_column,
            &cli.status_column,
            cli.title_column.as_deref(),
            cli.resolution_column.as_deref(),
            &extras,
        )?;

        Ok(Self {
            jira,
            sheet,
            schema,
            done: DoneSet::parse(&cli.done_statuses),
        })
    }
}

fn require(value: Option<&str>, name: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::Config(format!("{name} is not set"))),
    }
}

/// Parse `Header=field` pairs, e.g. `Assignee=assignee,Project=project`.
fn parse_extra_columns(spec: Option<&str>) -> Result<Vec<(String, String)>> {
    let Some(spec) = spec else {
        return Ok(Vec::new());
    };
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (header, field) = pair.split_once('=').ok_or_else(|| {
                Error::Config(format!(
                    "invalid extra column '{pair}', expected Header=field"
                ))
            })?;
            let (header, field) = (header.trim(), field.trim());
            if header.is_empty() || field.is_empty() {
                return Err(Error::Config(format!(
                    "invalid extra column '{pair}', expected Header=field"
                )));
            }
            Ok((header.to_string(), field.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_empty_and_whitespace() {
        assert!(require(None, "X").is_err());
        assert!(require(Some(""), "X").is_err());
        assert!(require(Some("  "), "X").is_err());
        assert_eq!(require(Some(" v "), "X").unwrap(), "v");
    }

    #[test]
    fn test_require_error_names_the_setting() {
        let err = require(None, "JIRA_URL / --jira-url").unwrap_err();
        assert!(err.to_string().contains("JIRA_URL"));
    }

    #[test]
    fn test_parse_extra_columns() {
        let extras =
            parse_extra_columns(Some("Assignee=assignee, Project=project")).unwrap();
        assert_eq!(
            extras,
            vec![
                ("Assignee".to_string(), "assignee".to_string()),
                ("Project".to_string(), "project".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_extra_columns_none_and_empty() {
        assert!(parse_extra_columns(None).unwrap().is_empty());
        assert!(parse_extra_columns(Some("")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_extra_columns_rejects_bad_pairs() {
        assert!(parse_extra_columns(Some("Assignee")).is_err());
        assert!(parse_extra_columns(Some("=assignee")).is_err());
        assert!(parse_extra_columns(Some("Assignee=")).is_err());
    }
}
