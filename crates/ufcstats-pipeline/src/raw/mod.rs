//! Raw record set: read-only view over the extractor's CSV output
//!
//! Raw tables are loaded once per run and never written. Loading checks two
//! things before any row is staged: every required column is present, and
//! every row's `snapshot` belongs to this run.

mod rows;

pub use rows::{
    EventDetailsRow, EventDirectoryRow, FightDetailsRow, FighterDetailsRow, FighterDirectoryRow,
    RawRow,
};

use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

use ufcstats_common::{PipelineError, Result, RunDate};

use crate::run::RunContext;

/// Header aliases written by older extractor versions: (canonical, alias)
const COLUMN_ALIASES: &[(&str, &str)] = &[("fight_url", "bout_url"), ("fight_order", "bout_order")];

/// Page types the extractor produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageKind {
    EventDirectory,
    EventDetails,
    FightDetails,
    FighterDirectory,
    FighterDetails,
}

impl PageKind {
    pub const ALL: [PageKind; 5] = [
        PageKind::EventDirectory,
        PageKind::EventDetails,
        PageKind::FightDetails,
        PageKind::FighterDirectory,
        PageKind::FighterDetails,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            PageKind::EventDirectory => "event_directory",
            PageKind::EventDetails => "event_details",
            PageKind::FightDetails => "fight_details",
            PageKind::FighterDirectory => "fighter_directory",
            PageKind::FighterDetails => "fighter_details",
        }
    }

    /// Columns that must appear in the header
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            PageKind::EventDirectory => &[
                "event_url",
                "event_name",
                "event_date_raw",
                "event_location_raw",
                "snapshot",
            ],
            PageKind::EventDetails => &[
                "fight_url",
                "event_url",
                "event_name",
                "fighter_1_url",
                "fighter_2_url",
                "fight_order",
                "snapshot",
            ],
            PageKind::FightDetails => &[
                "fight_url",
                "event_url",
                "fighter_1_url",
                "fighter_2_url",
                "weight_class_raw",
                "method_raw",
                "round_raw",
                "time_raw",
                "snapshot",
            ],
            PageKind::FighterDirectory => &[
                "fighter_url",
                "fighter_name",
                "height_raw",
                "weight_raw",
                "reach_raw",
                "snapshot",
            ],
            PageKind::FighterDetails => &[
                "fighter_url",
                "first_name",
                "last_name",
                "dob_raw",
                "slpm",
                "str_acc",
                "sapm",
                "str_def",
                "td_avg",
                "td_acc",
                "td_def",
                "sub_avg",
                "snapshot",
            ],
        }
    }
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.table_name())
    }
}

/// Rows of one raw page table, in file order
///
/// There is no way to mutate a table once it is built.
#[derive(Debug, Clone)]
pub struct RawTable<T> {
    rows: Vec<T>,
}

impl<T: RawRow + DeserializeOwned> RawTable<T> {
    /// Read a table from any CSV source
    pub fn from_reader<R: Read>(reader: R, run_date: RunDate) -> Result<Self> {
        let page = T::PAGE;
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        check_columns(page, &headers)?;

        let expected = run_date.to_string();
        let mut rows = Vec::new();
        for (idx, record) in csv_reader.deserialize::<T>().enumerate() {
            let row = record?;
            let snapshot = row.snapshot().trim();
            if !snapshot.is_empty() && snapshot != expected {
                return Err(PipelineError::SnapshotMismatch {
                    table: page.table_name().to_string(),
                    row: idx + 1,
                    found: snapshot.to_string(),
                    run_date: expected,
                });
            }
            rows.push(row);
        }

        debug!("Read {} {} rows", rows.len(), page);
        Ok(Self { rows })
    }

    /// Read a table from a file
    pub fn from_path(path: &Path, run_date: RunDate) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingInput(path.to_path_buf()));
        }
        if let Some(file_date) = RunDate::infer_from_path(path) {
            if file_date != run_date {
                debug!(
                    "{} is named for {}, loading it for run {}",
                    path.display(),
                    file_date,
                    run_date
                );
            }
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, run_date)
    }
}

impl<T> RawTable<T> {
    /// Build a table from rows already in memory
    pub fn from_rows(rows: Vec<T>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }
}

fn check_columns(page: PageKind, headers: &csv::StringRecord) -> Result<()> {
    let present = |name: &str| headers.iter().any(|h| h == name);

    for column in page.required_columns() {
        let alias = COLUMN_ALIASES
            .iter()
            .find(|(canonical, _)| canonical == column)
            .map(|(_, alias)| *alias);

        if !present(column) && !alias.is_some_and(|a| present(a)) {
            return Err(PipelineError::MissingColumn {
                table: page.table_name().to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// All raw tables of one run
#[derive(Debug, Clone)]
pub struct RawRecordSet {
    pub event_directory: RawTable<EventDirectoryRow>,
    pub event_details: RawTable<EventDetailsRow>,
    pub fight_details: RawTable<FightDetailsRow>,
    pub fighter_directory: RawTable<FighterDirectoryRow>,
    pub fighter_details: RawTable<FighterDetailsRow>,
}

impl RawRecordSet {
    /// Load every raw table of the run from `<run_dir>/raw/`
    #[instrument(skip_all, fields(run_date = %ctx.run_date()))]
    pub fn load(ctx: &RunContext) -> Result<Self> {
        let layout = ctx.layout();
        let run_date = ctx.run_date();
        let path = |page: PageKind| layout.raw_file(page.table_name());

        let set = Self {
            event_directory: RawTable::from_path(&path(PageKind::EventDirectory), run_date)?,
            event_details: RawTable::from_path(&path(PageKind::EventDetails), run_date)?,
            fight_details: RawTable::from_path(&path(PageKind::FightDetails), run_date)?,
            fighter_directory: RawTable::from_path(&path(PageKind::FighterDirectory), run_date)?,
            fighter_details: RawTable::from_path(&path(PageKind::FighterDetails), run_date)?,
        };

        info!(
            event_directory = set.event_directory.len(),
            event_details = set.event_details.len(),
            fight_details = set.fight_details.len(),
            fighter_directory = set.fighter_directory.len(),
            fighter_details = set.fighter_details.len(),
            "Loaded raw tables"
        );
        Ok(set)
    }

    pub fn count(&self, page: PageKind) -> usize {
        match page {
            PageKind::EventDirectory => self.event_directory.len(),
            PageKind::EventDetails => self.event_details.len(),
            PageKind::FightDetails => self.fight_details.len(),
            PageKind::FighterDirectory => self.fighter_directory.len(),
            PageKind::FighterDetails => self.fighter_details.len(),
        }
    }
}
