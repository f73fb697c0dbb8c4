//! Staged record set: every raw row coerced and flagged
//!
//! Staging is a per-row map with no filtering and no cross-row logic, so it
//! runs in parallel on the run's worker pool. Output order matches input
//! order and `count(staged) == count(raw)` for every page.

mod rows;

pub use rows::{
    StagedBoutListing, StagedEventDirectory, StagedFightDetails, StagedFighterDetails,
    StagedFighterDirectory, StagedRow,
};

use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, info, info_span};

use ufcstats_common::{PipelineError, Result, RunDate};

use crate::completeness::{FieldStatus, Flagged};
use crate::raw::{PageKind, RawRecordSet, RawRow, RawTable};
use crate::run::{RunContext, STAGED_DIR};
use crate::table::RecordBuilder;

/// Per-page completeness tally, logged after staging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSummary {
    pub rows: usize,
    pub complete_rows: usize,
    pub unparseable_fields: usize,
    pub missing_fields: usize,
}

/// Typed rows for every page of one run
#[derive(Debug, Clone)]
pub struct StagedRecordSet {
    pub run_date: RunDate,
    pub event_directory: Vec<StagedEventDirectory>,
    pub bout_listings: Vec<StagedBoutListing>,
    pub fight_details: Vec<StagedFightDetails>,
    pub fighter_directory: Vec<StagedFighterDirectory>,
    pub fighter_details: Vec<StagedFighterDetails>,
}

impl StagedRecordSet {
    /// Coerce and flag every raw row of the run
    pub fn stage(raw: &RawRecordSet, ctx: &RunContext) -> Self {
        let _span = info_span!("stage", run_date = %ctx.run_date()).entered();

        let set = ctx.install(|| Self {
            run_date: ctx.run_date(),
            event_directory: stage_table(&raw.event_directory),
            bout_listings: stage_table(&raw.event_details),
            fight_details: stage_table(&raw.fight_details),
            fighter_directory: stage_table(&raw.fighter_directory),
            fighter_details: stage_table(&raw.fighter_details),
        });

        for page in PageKind::ALL {
            let summary = set.summary(page);
            info!(
                page = %page,
                rows = summary.rows,
                complete = summary.complete_rows,
                unparseable = summary.unparseable_fields,
                missing = summary.missing_fields,
                "Staged page"
            );
        }
        set
    }

    pub fn count(&self, page: PageKind) -> usize {
        match page {
            PageKind::EventDirectory => self.event_directory.len(),
            PageKind::EventDetails => self.bout_listings.len(),
            PageKind::FightDetails => self.fight_details.len(),
            PageKind::FighterDirectory => self.fighter_directory.len(),
            PageKind::FighterDetails => self.fighter_details.len(),
        }
    }

    pub fn summary(&self, page: PageKind) -> StageSummary {
        match page {
            PageKind::EventDirectory => summarize(&self.event_directory),
            PageKind::EventDetails => summarize(&self.bout_listings),
            PageKind::FightDetails => summarize(&self.fight_details),
            PageKind::FighterDirectory => summarize(&self.fighter_directory),
            PageKind::FighterDetails => summarize(&self.fighter_details),
        }
    }

    /// Write every staged table, replacing any earlier staged output
    ///
    /// Tables are written to `staged.partial/` first and swapped in whole,
    /// so the staged directory never mixes two stagings.
    pub fn write(&self, ctx: &RunContext) -> Result<()> {
        let layout = ctx.layout();
        let partial = layout.partial_dir(STAGED_DIR);
        let target = layout.staged_dir();

        if partial.exists() {
            fs::remove_dir_all(&partial)?;
        }
        fs::create_dir_all(&partial)?;

        let written = (|| -> Result<()> {
            let path = |page: PageKind| partial.join(layout.file_name(page.table_name()));
            write_table(&path(PageKind::EventDirectory), &self.event_directory)?;
            write_table(&path(PageKind::EventDetails), &self.bout_listings)?;
            write_table(&path(PageKind::FightDetails), &self.fight_details)?;
            write_table(&path(PageKind::FighterDirectory), &self.fighter_directory)?;
            write_table(&path(PageKind::FighterDetails), &self.fighter_details)?;

            if target.exists() {
                debug!("Replacing staged tables in {}", target.display());
                fs::remove_dir_all(&target)?;
            }
            fs::rename(&partial, &target)?;
            Ok(())
        })();

        if written.is_err() && partial.exists() {
            fs::remove_dir_all(&partial)?;
        }
        written?;

        info!("Wrote staged tables to {}", target.display());
        Ok(())
    }
}

fn stage_table<S: StagedRow>(raw: &RawTable<S::Raw>) -> Vec<S> {
    let staged: Vec<S> = raw.rows().par_iter().map(S::stage).collect();
    debug!("Staged {} {} rows", staged.len(), <S::Raw as RawRow>::PAGE);
    staged
}

fn summarize<S: Flagged>(rows: &[S]) -> StageSummary {
    rows.iter().fold(
        StageSummary {
            rows: rows.len(),
            ..Default::default()
        },
        |mut summary, row| {
            let flags = row.completeness();
            if flags.is_complete() {
                summary.complete_rows += 1;
            }
            summary.unparseable_fields += flags.count(FieldStatus::Unparseable);
            summary.missing_fields += flags.count(FieldStatus::Missing);
            summary
        },
    )
}

fn write_table<S: StagedRow>(path: &Path, rows: &[S]) -> Result<()> {
    let mut header = RecordBuilder::new();
    S::default().write_record(&mut header);

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header.columns())?;
    for row in rows {
        let mut rec = RecordBuilder::new();
        row.write_record(&mut rec);
        if rec.columns() != header.columns() {
            return Err(PipelineError::schema(
                path.display().to_string(),
                "staged row columns differ from header",
            ));
        }
        writer.write_record(rec.into_values())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::raw::{
        EventDetailsRow, EventDirectoryRow, FightDetailsRow, FighterDetailsRow,
        FighterDirectoryRow,
    };
    use tempfile::TempDir;

    fn raw_set() -> RawRecordSet {
        let fighters = (0..50)
            .map(|i| FighterDirectoryRow {
                fighter_url: format!("http://ufcstats.com/fighter-details/f{}", i),
                fighter_name: format!("Fighter {}", i),
                height_raw: if i % 5 == 0 { "--".to_string() } else { "5' 11\"".to_string() },
                weight_raw: "155 lbs.".to_string(),
                reach_raw: if i % 7 == 0 { "long".to_string() } else { "72.0\"".to_string() },
                ..Default::default()
            })
            .collect();
        RawRecordSet {
            event_directory: RawTable::from_rows(vec![EventDirectoryRow::default()]),
            event_details: RawTable::from_rows(vec![EventDetailsRow::default(); 3]),
            fight_details: RawTable::from_rows(Vec::<FightDetailsRow>::new()),
            fighter_directory: RawTable::from_rows(fighters),
            fighter_details: RawTable::from_rows(vec![FighterDetailsRow::default(); 2]),
        }
    }

    fn context(root: &Path) -> RunContext {
        let config = PipelineConfig::default()
            .with_data_root(root)
            .with_worker_threads(4);
        RunContext::new(config, RunDate::parse("2026-01-24").unwrap()).unwrap()
    }

    #[test]
    fn test_staging_preserves_counts_and_order() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let raw = raw_set();
        let staged = StagedRecordSet::stage(&raw, &ctx);

        for page in PageKind::ALL {
            assert_eq!(staged.count(page), raw.count(page), "{page}");
        }
        for (raw_row, staged_row) in raw.fighter_directory.iter().zip(&staged.fighter_directory) {
            assert_eq!(raw_row.fighter_url, staged_row.fighter_url);
        }
    }

    #[test]
    fn test_summary_counts_flags() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let staged = StagedRecordSet::stage(&raw_set(), &ctx);
        let summary = staged.summary(PageKind::FighterDirectory);

        assert_eq!(summary.rows, 50);
        // heights 0,5,..45 missing; reaches 0,7,..49 unparseable
        assert_eq!(summary.unparseable_fields, 8);
        assert!(summary.missing_fields >= 10);
    }

    #[test]
    fn test_write_replaces_previous_staging() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let staged = StagedRecordSet::stage(&raw_set(), &ctx);

        staged.write(&ctx).unwrap();
        let stale = ctx.layout().staged_dir().join("stale.csv");
        fs::write(&stale, "x").unwrap();
        staged.write(&ctx).unwrap();

        assert!(!stale.exists());
        assert!(!ctx.layout().partial_dir(STAGED_DIR).exists());
        let file = ctx
            .layout()
            .staged_dir()
            .join(ctx.layout().file_name("fighter_directory"));
        let content = fs::read_to_string(file).unwrap();
        assert_eq!(content.lines().count(), 51);
        assert!(content.starts_with("fighter_url,fighter_name,fighter_name_status,"));
    }
}
