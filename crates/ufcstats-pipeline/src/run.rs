//! Run context and on-disk layout
//!
//! Every stage receives a [`RunContext`] explicitly. It owns the run date,
//! the directory layout derived from it, the configuration and the worker
//! pool, so two runs for different dates never share state.
//!
//! # Layout
//! ```text
//! <data_root>/<run_date>/
//!   raw/<page>__<source>__<run_date>.csv
//!   staged/<page>__<source>__<run_date>.csv
//!   published/<table>__<source>__<run_date>.csv
//!   published/_manifest.json
//! ```

use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::{Path, PathBuf};

use ufcstats_common::{PipelineError, Result, RunDate};

use crate::config::PipelineConfig;

pub const RAW_DIR: &str = "raw";
pub const STAGED_DIR: &str = "staged";
pub const PUBLISHED_DIR: &str = "published";
pub const MANIFEST_FILE: &str = "_manifest.json";

/// Suffix of the scratch directory a layer is built in before being renamed
const PARTIAL_SUFFIX: &str = ".partial";

/// Paths for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    run_dir: PathBuf,
    source: String,
    run_date: RunDate,
}

impl RunLayout {
    pub fn new(data_root: &Path, source: &str, run_date: RunDate) -> Self {
        Self {
            run_dir: data_root.join(run_date.to_string()),
            source: source.to_string(),
            run_date,
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.run_dir.join(RAW_DIR)
    }

    pub fn staged_dir(&self) -> PathBuf {
        self.run_dir.join(STAGED_DIR)
    }

    pub fn published_dir(&self) -> PathBuf {
        self.run_dir.join(PUBLISHED_DIR)
    }

    pub fn partial_dir(&self, layer: &str) -> PathBuf {
        self.run_dir.join(format!("{}{}", layer, PARTIAL_SUFFIX))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.published_dir().join(MANIFEST_FILE)
    }

    /// `<table>__<source>__<run_date>.csv`
    pub fn file_name(&self, table: &str) -> String {
        format!("{}__{}__{}.csv", table, self.source, self.run_date)
    }

    pub fn raw_file(&self, page: &str) -> PathBuf {
        self.raw_dir().join(self.file_name(page))
    }
}

/// Everything a stage needs to know about the run it belongs to
pub struct RunContext {
    run_date: RunDate,
    layout: RunLayout,
    config: PipelineConfig,
    pool: ThreadPool,
}

impl RunContext {
    pub fn new(config: PipelineConfig, run_date: RunDate) -> Result<Self> {
        config.validate()?;

        let mut builder = ThreadPoolBuilder::new()
            .thread_name(move |i| format!("ufcstats-{}-{}", run_date, i));
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| PipelineError::config(format!("Failed to build worker pool: {}", e)))?;

        let layout = RunLayout::new(&config.data_root, &config.source_name, run_date);
        Ok(Self {
            run_date,
            layout,
            config,
            pool,
        })
    }

    pub fn run_date(&self) -> RunDate {
        self.run_date
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run `op` inside this run's worker pool
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("run_date", &self.run_date)
            .field("layout", &self.layout)
            .field("config", &self.config)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}
