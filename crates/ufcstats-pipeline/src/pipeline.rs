//! End-to-end run entry points used by the CLI

use tracing::{info, info_span};

use ufcstats_common::Result;

use crate::publish::{Manifest, PublishWriter};
use crate::raw::RawRecordSet;
use crate::resolve::EntityResolver;
use crate::run::RunContext;
use crate::staged::StagedRecordSet;

/// Load and stage the run's raw pages, persisting staged tables if configured
pub fn run_stage(ctx: &RunContext) -> Result<StagedRecordSet> {
    let _span = info_span!("run", run_date = %ctx.run_date()).entered();

    let raw = RawRecordSet::load(ctx)?;
    let staged = StagedRecordSet::stage(&raw, ctx);
    if ctx.config().write_staged {
        staged.write(ctx)?;
    }
    Ok(staged)
}

/// Stage, resolve and publish one run
pub fn run_publish(ctx: &RunContext) -> Result<Manifest> {
    let staged = run_stage(ctx)?;
    let tables = EntityResolver::new(&staged).resolve(ctx)?;
    let manifest = PublishWriter::new(ctx).write(&tables)?;

    info!(
        run_date = %ctx.run_date(),
        tables = manifest.tables.len(),
        "Run complete"
    );
    Ok(manifest)
}

/// Read back a published run's manifest, optionally re-checking file hashes
pub fn inspect(ctx: &RunContext, verify: bool) -> Result<Manifest> {
    let layout = ctx.layout();
    let manifest = Manifest::load(&layout.manifest_path())?;
    if verify {
        manifest.verify(&layout.published_dir())?;
        info!("All {} published files match the manifest", manifest.tables.len());
    }
    Ok(manifest)
}
