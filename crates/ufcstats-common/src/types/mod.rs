//! Common types used across the pipeline

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{PipelineError, Result};

/// Date format used for run dates in directory and file names
pub const RUN_DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifies one pipeline run.
///
/// A run is addressed purely by its date; raw, staged and published outputs
/// all live under a directory named after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunDate(NaiveDate);

impl RunDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYY-MM-DD` run date
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), RUN_DATE_FORMAT)
            .map(Self)
            .map_err(|_| PipelineError::InvalidRunDate(s.to_string()))
    }

    /// Today's date in UTC
    pub fn today_utc() -> Self {
        Self(chrono::Utc::now().date_naive())
    }

    /// Find the first `20YY-MM-DD` in a file name
    ///
    /// Extractor output is named `<page>__<source>__<date>.csv`, so the run a
    /// file belongs to can be recovered from its name alone.
    pub fn infer_from_path(path: impl AsRef<Path>) -> Option<Self> {
        static DATE_RE: OnceLock<Option<Regex>> = OnceLock::new();
        let re = DATE_RE
            .get_or_init(|| Regex::new(r"(20\d{2}-\d{2}-\d{2})").ok())
            .as_ref()?;

        let name = path.as_ref().file_name()?.to_string_lossy();
        let m = re.captures(&name)?.get(1)?;
        Self::parse(m.as_str()).ok()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for RunDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(RUN_DATE_FORMAT))
    }
}

impl std::str::FromStr for RunDate {
    type Err = PipelineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RunDate {
    type Error = PipelineError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RunDate> for String {
    fn from(d: RunDate) -> Self {
        d.to_string()
    }
}
