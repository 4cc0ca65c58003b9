//! Error types for the sheetsync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=config, 3=schema, 4=tracker, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

/// Result type alias for sheetsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Agents match on the string; shell scripts on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Configuration (exit 2)
    ConfigError,

    // Schema (exit 3)
    SchemaMismatch,
    SheetTooWide,

    // Tracker transport (exit 4)
    TrackerError,

    // Sheet transport (exit 5)
    SheetError,

    // I/O (exit 6)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::SchemaMismatch => "SCHEMA_MISMATCH",
            Self::SheetTooWide => "SHEET_TOO_WIDE",
            Self::TrackerError => "TRACKER_ERROR",
            Self::SheetError => "SHEET_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-6).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::ConfigError => 2,
            Self::SchemaMismatch | Self::SheetTooWide => 3,
            Self::TrackerError => 4,
            Self::SheetError => 5,
            Self::IoError | Self::JsonError => 6,
        }
    }

    /// Whether rerunning with corrected input can succeed.
    ///
    /// True for configuration and schema problems the operator can fix;
    /// false for transport and internal failures.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConfigError | Self::SchemaMismatch | Self::SheetTooWide)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur during a reconciliation run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Column '{column}' not found in the sheet header")]
    SchemaMismatch { column: String },

    #[error("Column '{column}' is at position {index}, beyond column Z")]
    SheetTooWide { column: String, index: usize },

    #[error("Tracker request failed: {0}")]
    Tracker(String),

    #[error("Sheet request failed: {0}")]
    Sheet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::ConfigError,
            Self::SchemaMismatch { .. } => ErrorCode::SchemaMismatch,
            Self::SheetTooWide { .. } => ErrorCode::SheetTooWide,
            Self::Tracker(_) => ErrorCode::TrackerError,
            Self::Sheet(_) => ErrorCode::SheetError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for operators.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Config(msg) => {
                if msg.contains("JIRA") {
                    Some(
                        "Set JIRA_URL, JIRA_EMAIL, JIRA_API_TOKEN and JIRA_JQL, \
                         or pass --jira-url/--jira-email/--jira-token/--jql."
                            .to_string(),
                    )
                } else if msg.contains("SHEET") {
                    Some(
                        "Set SHEET_ID, SHEET_TAB and SHEETS_TOKEN, \
                         or pass --sheet-id/--sheet-tab/--sheets-token."
                            .to_string(),
                    )
                } else {
                    None
                }
            }

            Self::SchemaMismatch { column } => Some(format!(
                "The sheet's header row has no column named '{column}'. \
                 Check --key-column/--status-column (and the optional \
                 --title-column/--resolution-column) against row 1 of the tab."
            )),

            Self::SheetTooWide { .. } => Some(
                "Range addressing uses single column letters (A-Z). \
                 Move the mapped columns into the first 26 columns of the tab."
                    .to_string(),
            ),

            Self::Tracker(_) => Some(
                "Check JIRA_URL, credentials and the JQL filter. \
                 Nothing was written to the sheet for tasks that were not fetched; \
                 rerunning is safe."
                    .to_string(),
            ),

            Self::Sheet(_) => Some(
                "Check SHEET_ID, the tab name and the access token's scopes. \
                 Rerunning is safe: only still-different cells are rewritten."
                    .to_string(),
            ),

            Self::Io(_) | Self::Json(_) | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
