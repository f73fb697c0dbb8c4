//! UFCStats Pipeline - Transform a raw UFCStats scrape into published tables

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use ufcstats_common::logging::{init_logging, LogConfig, LogLevel};
use ufcstats_common::{PipelineError, RunDate};
use ufcstats_pipeline::pipeline;
use ufcstats_pipeline::raw::PageKind;
use ufcstats_pipeline::{OrphanPolicy, PipelineConfig, RunContext};

#[derive(Parser, Debug)]
#[command(name = "ufcstats-pipeline")]
#[command(author, version, about = "UFCStats raw-to-published transform")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding one sub-directory per run date
    #[arg(long, global = true, env = "UFCSTATS_DATA_ROOT")]
    data_root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true, env = "UFCSTATS_CONFIG")]
    config: Option<PathBuf>,

    /// Fail the run instead of flagging bouts with unresolved references
    #[arg(long, global = true)]
    reject_orphans: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Run date (YYYY-MM-DD); defaults to today in UTC
    #[arg(short, long)]
    run_date: Option<RunDate>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Coerce and flag the run's raw pages into staged tables
    Stage {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Stage, resolve entities and write the published tables
    Publish {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Print a published run's manifest
    Inspect {
        #[command(flatten)]
        run: RunArgs,

        /// Re-hash the published files against the manifest
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("ufcstats-pipeline")
        .build();

    // environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // the pipeline still runs without logging
    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        },
    };

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            let fatal = e
                .downcast_ref::<PipelineError>()
                .is_some_and(PipelineError::is_run_fatal);
            if fatal {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        },
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())
        .context("Failed to load pipeline configuration")?;
    if let Some(root) = &cli.data_root {
        config = config.with_data_root(root);
    }
    if cli.reject_orphans {
        config = config.with_orphan_policy(OrphanPolicy::Reject);
    }

    match &cli.command {
        Command::Stage { run } => {
            let ctx = context(config, run)?;
            let staged = pipeline::run_stage(&ctx)?;
            for page in PageKind::ALL {
                let summary = staged.summary(page);
                println!(
                    "{:<18} rows={:<6} complete={:<6} unparseable_fields={:<6} missing_fields={}",
                    page,
                    summary.rows,
                    summary.complete_rows,
                    summary.unparseable_fields,
                    summary.missing_fields
                );
            }
        },
        Command::Publish { run } => {
            let ctx = context(config, run)?;
            let manifest = pipeline::run_publish(&ctx)?;
            for table in &manifest.tables {
                println!("{:<12} rows={:<6} {}", table.table, table.rows, table.file);
            }
        },
        Command::Inspect { run, verify } => {
            let ctx = context(config, run)?;
            let manifest = pipeline::inspect(&ctx, *verify)?;
            println!("{}", manifest.to_json()?);
        },
    }

    Ok(())
}

fn context(config: PipelineConfig, run: &RunArgs) -> Result<RunContext> {
    let run_date = run.run_date.unwrap_or_else(RunDate::today_utc);
    info!("Run {} under {}", run_date, config.data_root.display());
    Ok(RunContext::new(config, run_date)?)
}
