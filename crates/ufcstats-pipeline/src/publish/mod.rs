//! Published table writer
//!
//! Serializes the resolved tables of one run into `dim_fighter`,
//! `dim_event` and `fact_bout`, plus a manifest. Output is all or nothing:
//! every table is rendered and validated in memory first, written into a
//! scratch directory, and only then moved into place.

pub mod manifest;
pub mod schema;
pub mod tables;

pub use manifest::{Manifest, ManifestTable};
pub use schema::{Column, ColumnType, TableSchema, DIM_EVENT, DIM_FIGHTER, FACT_BOUT, PUBLISHED_TABLES};
pub use tables::RenderedTable;

use std::fs;
use std::path::Path;
use tracing::{debug, info, info_span, warn};

use ufcstats_common::checksum::sha256_hex;
use ufcstats_common::{PipelineError, Result};

use crate::config::OrphanPolicy;
use crate::resolve::ResolvedTables;
use crate::run::{RunContext, MANIFEST_FILE, PUBLISHED_DIR};

pub struct PublishWriter<'a> {
    ctx: &'a RunContext,
}

impl<'a> PublishWriter<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    /// Write the three tables and the manifest for this run
    ///
    /// Fails without touching disk when the run is rejected by the orphan
    /// policy or already has published output.
    pub fn write(&self, tables: &ResolvedTables) -> Result<Manifest> {
        let ctx = self.ctx;
        let _span = info_span!("publish", run_date = %ctx.run_date()).entered();
        let layout = ctx.layout();
        let target = layout.published_dir();

        let unresolved = tables.report.unresolved_refs();
        if unresolved > 0 && ctx.config().orphan_policy == OrphanPolicy::Reject {
            return Err(PipelineError::IncompleteRun(unresolved));
        }
        if is_populated(&target)? {
            return Err(PipelineError::RunDirectoryCollision(target));
        }

        let rendered = self.render(tables)?;
        let manifest = Manifest {
            run_date: ctx.run_date(),
            source: ctx.config().source_name.clone(),
            tables: rendered
                .iter()
                .map(|table| ManifestTable {
                    table: table.schema.name.to_string(),
                    file: layout.file_name(table.schema.name),
                    rows: table.rows,
                    sha256: sha256_hex(&table.bytes),
                })
                .collect(),
            resolution: tables.report.clone(),
        };

        let partial = layout.partial_dir(PUBLISHED_DIR);
        if partial.exists() {
            warn!("Removing leftover {}", partial.display());
            fs::remove_dir_all(&partial)?;
        }
        fs::create_dir_all(&partial)?;

        let written = (|| -> Result<()> {
            for (table, entry) in rendered.iter().zip(&manifest.tables) {
                fs::write(partial.join(&entry.file), &table.bytes)?;
                debug!("Wrote {} rows to {}", table.rows, entry.file);
            }
            fs::write(partial.join(MANIFEST_FILE), manifest.to_json()?)?;

            if target.exists() {
                fs::remove_dir(&target)?;
            }
            fs::rename(&partial, &target)?;
            Ok(())
        })();

        if written.is_err() && partial.exists() {
            fs::remove_dir_all(&partial)?;
        }
        written?;

        info!(
            fighters = manifest.resolution.fighters,
            events = manifest.resolution.events,
            bouts = manifest.resolution.bouts,
            "Published tables to {}",
            target.display()
        );
        Ok(manifest)
    }

    fn render(&self, resolved: &ResolvedTables) -> Result<Vec<RenderedTable>> {
        use tables::{bout_record, event_record, fighter_record, render};

        let run_date = self.ctx.run_date().to_string();
        Ok(vec![
            render(&DIM_FIGHTER, resolved.fighters.values(), &run_date, fighter_record)?,
            render(&DIM_EVENT, resolved.events.values(), &run_date, event_record)?,
            render(&FACT_BOUT, resolved.bouts.values(), &run_date, bout_record)?,
        ])
    }
}

fn is_populated(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    Ok(fs::read_dir(dir)?.next().is_some())
}
