//! Pipeline configuration
//!
//! Layered in this order, later layers winning: compiled defaults, an
//! optional TOML file, environment variables (with `.env` support), then
//! command-line flags applied by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use ufcstats_common::{PipelineError, Result};

// ============================================================================
// Pipeline Configuration Constants
// ============================================================================

/// Default root holding one directory per run date.
pub const DEFAULT_DATA_ROOT: &str = "./data";

/// Default source name used as the file-name infix.
pub const DEFAULT_SOURCE_NAME: &str = "ufcstats";

/// Environment variable naming a TOML config file.
pub const CONFIG_FILE_ENV: &str = "UFCSTATS_CONFIG";

const DATA_ROOT_ENV: &str = "UFCSTATS_DATA_ROOT";
const ORPHAN_POLICY_ENV: &str = "UFCSTATS_ORPHAN_POLICY";
const WORKER_THREADS_ENV: &str = "UFCSTATS_WORKER_THREADS";
const WRITE_STAGED_ENV: &str = "UFCSTATS_WRITE_STAGED";

/// What publishing does with bouts whose references do not resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Keep the bout and mark the reference (preserve all records)
    #[default]
    Flag,
    /// Refuse to publish a run with any unresolved reference
    Reject,
}

impl std::str::FromStr for OrphanPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "flag" => Ok(OrphanPolicy::Flag),
            "reject" => Ok(OrphanPolicy::Reject),
            other => Err(PipelineError::config(format!(
                "Invalid orphan policy '{}': expected 'flag' or 'reject'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrphanPolicy::Flag => f.write_str("flag"),
            OrphanPolicy::Reject => f.write_str("reject"),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding `<run_date>/raw|staged|published`
    pub data_root: PathBuf,

    pub orphan_policy: OrphanPolicy,

    /// Worker pool size for per-row staging (None for one per core)
    pub worker_threads: Option<usize>,

    /// Persist staged tables next to the published ones
    pub write_staged: bool,

    /// File-name infix: `<page>__<source>__<run_date>.csv`
    pub source_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            orphan_policy: OrphanPolicy::Flag,
            worker_threads: None,
            write_staged: true,
            source_name: DEFAULT_SOURCE_NAME.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from defaults, an optional file and the environment
    ///
    /// `file` takes precedence over `UFCSTATS_CONFIG`.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from));

        let config = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        let config = config.merge_env_from(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; keys it omits keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingInput(path.to_path_buf()));
        }
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `UFCSTATS_*` overrides read through `lookup`
    pub fn merge_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(DATA_ROOT_ENV) {
            self.data_root = PathBuf::from(root);
        }
        if let Some(policy) = lookup(ORPHAN_POLICY_ENV) {
            self.orphan_policy = policy.parse()?;
        }
        if let Some(threads) = lookup(WORKER_THREADS_ENV) {
            let threads = threads.trim().parse().map_err(|_| {
                PipelineError::config(format!("{} must be a number, got '{}'", WORKER_THREADS_ENV, threads))
            })?;
            self.worker_threads = Some(threads);
        }
        if let Some(write) = lookup(WRITE_STAGED_ENV) {
            self.write_staged = write.trim().parse().map_err(|_| {
                PipelineError::config(format!("{} must be true or false, got '{}'", WRITE_STAGED_ENV, write))
            })?;
        }
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == Some(0) {
            return Err(PipelineError::config("worker_threads must be greater than 0"));
        }

        if self.source_name.trim().is_empty() {
            return Err(PipelineError::config("source_name cannot be empty"));
        }

        // the source name is embedded in file names
        if self.source_name.contains(['/', '\\']) || self.source_name.contains("__") {
            return Err(PipelineError::config(format!(
                "source_name '{}' cannot contain path separators or '__'",
                self.source_name
            )));
        }

        Ok(())
    }

    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_write_staged(mut self, write: bool) -> Self {
        self.write_staged = write;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.data_root, PathBuf::from(DEFAULT_DATA_ROOT));
        assert_eq!(config.orphan_policy, OrphanPolicy::Flag);
        assert_eq!(config.source_name, DEFAULT_SOURCE_NAME);
        assert!(config.write_staged);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = PipelineConfig::default()
            .merge_env_from(env(&[
                ("UFCSTATS_DATA_ROOT", "/srv/ufc"),
                ("UFCSTATS_ORPHAN_POLICY", "Reject"),
                ("UFCSTATS_WORKER_THREADS", "4"),
                ("UFCSTATS_WRITE_STAGED", "false"),
            ]))
            .unwrap();

        assert_eq!(config.data_root, PathBuf::from("/srv/ufc"));
        assert_eq!(config.orphan_policy, OrphanPolicy::Reject);
        assert_eq!(config.worker_threads, Some(4));
        assert!(!config.write_staged);
    }

    #[test]
    fn test_bad_env_values_are_errors() {
        let result = PipelineConfig::default()
            .merge_env_from(env(&[("UFCSTATS_ORPHAN_POLICY", "drop")]));
        assert!(matches!(result, Err(PipelineError::Config(_))));

        let result = PipelineConfig::default()
            .merge_env_from(env(&[("UFCSTATS_WORKER_THREADS", "many")]));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_toml_file_keeps_unset_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "orphan_policy = \"reject\"\nworker_threads = 2\n").unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.orphan_policy, OrphanPolicy::Reject);
        assert_eq!(config.worker_threads, Some(2));
        assert_eq!(config.source_name, DEFAULT_SOURCE_NAME);
    }

    #[test]
    fn test_missing_config_file() {
        let result = PipelineConfig::from_file(Path::new("/nonexistent/pipeline.toml"));
        assert!(matches!(result, Err(PipelineError::MissingInput(_))));
    }

    #[test]
    fn test_validate() {
        let config = PipelineConfig::default().with_worker_threads(0);
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            source_name: "a__b".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
