//! UFCStats Pipeline Library
//!
//! Turns one run's raw UFCStats scrape into typed, keyed, published tables.
//!
//! # Stages
//!
//! - **raw**: read the extractor's CSV pages for a run date
//! - **staged**: coerce every field, flagging what did not parse
//! - **resolve**: join pages into fighter, event and bout entities
//! - **publish**: write `dim_fighter`, `dim_event` and `fact_bout`
//!
//! # Example
//!
//! ```no_run
//! use ufcstats_common::RunDate;
//! use ufcstats_pipeline::config::PipelineConfig;
//! use ufcstats_pipeline::pipeline::run_publish;
//! use ufcstats_pipeline::run::RunContext;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::load(None)?;
//!     let ctx = RunContext::new(config, RunDate::parse("2026-01-24")?)?;
//!     let manifest = run_publish(&ctx)?;
//!     println!("{} tables published", manifest.tables.len());
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod coerce;
pub mod completeness;
pub mod config;
pub mod keys;
pub mod pipeline;
pub mod publish;
pub mod raw;
pub mod resolve;
pub mod run;
pub mod staged;
pub mod table;

pub use config::{OrphanPolicy, PipelineConfig};
pub use run::RunContext;
