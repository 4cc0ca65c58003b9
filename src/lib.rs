//! sheetsync - one-way Jira-to-Google-Sheets task reconciliation
//!
//! This crate provides the core functionality for the `sheetsync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Task, DoneLabel)
//! - [`engine`] - Reconciliation engine: schema, snapshot table, join/diff, plan
//! - [`jira`] - Task source adapter (paginated JQL search)
//! - [`sheets`] - Sheet transport: snapshot read, batch update, append
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod jira;
pub mod model;
pub mod sheets;

pub use error::{Error, Result};
