//! Run manifest written next to the published tables

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use ufcstats_common::checksum::verify_file_checksum;
use ufcstats_common::{PipelineError, Result, RunDate};

use crate::resolve::ResolutionReport;

/// One published file as recorded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestTable {
    pub table: String,
    pub file: String,
    pub rows: usize,
    pub sha256: String,
}

/// Contents of `_manifest.json`
///
/// Holds nothing that varies between two publishes of the same raw input,
/// so reruns produce the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub run_date: RunDate,
    pub source: String,
    pub tables: Vec<ManifestTable>,
    pub resolution: ResolutionReport,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingInput(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn table(&self, name: &str) -> Option<&ManifestTable> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// Check every listed file in `dir` against its recorded checksum
    pub fn verify(&self, dir: &Path) -> Result<()> {
        for table in &self.tables {
            let path = dir.join(&table.file);
            if !path.exists() {
                return Err(PipelineError::MissingInput(path));
            }
            verify_file_checksum(&path, &table.sha256)?;
            debug!("Verified {}", table.file);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use ufcstats_common::checksum::sha256_hex;

    fn manifest(sha256: String) -> Manifest {
        Manifest {
            run_date: RunDate::parse("2026-01-24").unwrap(),
            source: "ufcstats".to_string(),
            tables: vec![ManifestTable {
                table: "dim_event".to_string(),
                file: "dim_event__ufcstats__2026-01-24.csv".to_string(),
                rows: 1,
                sha256,
            }],
            resolution: ResolutionReport::default(),
        }
    }

    #[test]
    fn test_manifest_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_manifest.json");
        let original = manifest("abc".to_string());
        fs::write(&path, original.to_json().unwrap()).unwrap();

        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded, original);
        assert!(loaded.to_json().unwrap().contains("\"run_date\": \"2026-01-24\""));
        assert_eq!(loaded.table("dim_event").unwrap().rows, 1);
        assert!(loaded.table("fact_bout").is_none());
    }

    #[test]
    fn test_verify_detects_modified_file() {
        let dir = TempDir::new().unwrap();
        let body = b"stable_event_key\nevent:e1\n";
        let file = dir.path().join("dim_event__ufcstats__2026-01-24.csv");
        fs::write(&file, body).unwrap();

        let m = manifest(sha256_hex(body));
        m.verify(dir.path()).unwrap();

        fs::write(&file, b"stable_event_key\nevent:e2\n").unwrap();
        let err = m.verify(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::load(&dir.path().join("_manifest.json")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }
}
