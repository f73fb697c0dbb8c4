//! UFCStats Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the UFCStats pipeline.
//!
//! # Overview
//!
//! - **Error Handling**: run-fatal error type and result alias
//! - **Logging**: tracing subscriber bootstrap shared by every binary
//! - **Checksums**: SHA-256 helpers for published table manifests
//! - **Types**: the `RunDate` that addresses a run
//!
//! # Example
//!
//! ```no_run
//! use ufcstats_common::{Result, RunDate};
//! use ufcstats_common::checksum::compute_file_checksum;
//!
//! fn checksum_table(path: &str) -> Result<()> {
//!     let run = RunDate::infer_from_path(path);
//!     let checksum = compute_file_checksum(path)?;
//!     println!("{:?}: {}", run, checksum);
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PipelineError, Result};
pub use types::RunDate;
