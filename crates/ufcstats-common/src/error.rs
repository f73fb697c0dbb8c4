//! Error types for the UFCStats pipeline
//!
//! Only run-fatal conditions live here. Per-row conditions (unparseable
//! values, explicit missing values, orphan references) are carried as flags
//! alongside the data and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("{table}: missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("{table} row {row}: snapshot '{found}' does not belong to run {run_date}")]
    SnapshotMismatch {
        table: String,
        row: usize,
        found: String,
        run_date: String,
    },

    /// Two identities mapped to one key, or one identity mapped to two keys.
    #[error("Key collision on {kind} key '{key}': '{first}' vs '{second}'")]
    KeyCollision {
        kind: String,
        key: String,
        first: String,
        second: String,
    },

    #[error("Run directory already populated: {}. Use a new run date.", .0.display())]
    RunDirectoryCollision(PathBuf),

    #[error("Run rejected: {0} orphaned bout references and orphan policy is 'reject'")]
    IncompleteRun(usize),

    #[error("Schema violation in {table}: {message}")]
    Schema { table: String, message: String },

    #[error("Invalid run date: {0}")]
    InvalidRunDate(String),

    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Create a schema violation error
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error must abort the run with no published output
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            Self::KeyCollision { .. } | Self::RunDirectoryCollision(_) | Self::IncompleteRun(_)
        )
    }
}
