//! Chlorine - minimal spec execution engine
//!
//! Runs the engine's self-check bundle and exits with the number of failed
//! specs.
//!
//! ## Usage
//!
//! ```bash
//! # Run the self-check bundle in parallel
//! chlorine run
//!
//! # Force serial execution, or bound the parallelism
//! chlorine run --serial
//! chlorine run --max-concurrent 2
//!
//! # List specs and their options
//! chlorine list
//!
//! # Write a default chlorine.yaml
//! chlorine init
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::info;

use chlorine::cli::{Args, Command, RunArgs};
use chlorine::config::{print_env_help, ConfigFile, EngineConfig, EnvConfig};
use chlorine::output::{ReportFormatter, StderrSink};
use chlorine::utils::{init_logger, LogLevel};
use chlorine::{selfcheck, BundleScheduler};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Run(run_args) => {
            let code = run_selfcheck(run_args, args.verbose).await?;
            std::process::exit(code);
        }
        Command::List => {
            list_specs();
        }
        Command::Env => {
            print_env_help();
        }
        Command::Init { output, force } => {
            init_config(&output, force)?;
        }
    }

    Ok(())
}

async fn run_selfcheck(args: RunArgs, verbose: bool) -> Result<i32> {
    let config = resolve_config(&args)?;
    let level = if verbose {
        LogLevel::Debug
    } else {
        config.log_level()
    };
    init_logger(level);

    let bundle = selfcheck::bundle().apply_config(&config);
    info!(
        "Running bundle {} (force_serial={}, max_concurrent={:?})",
        bundle.name(),
        config.force_serial,
        config.max_concurrent
    );

    let mut formatter = ReportFormatter::new();
    if args.no_timings {
        formatter = formatter.without_timings();
    }
    let summary = BundleScheduler::new(std::sync::Arc::new(StderrSink))
        .with_formatter(formatter)
        .run(&bundle)
        .await?;

    Ok(summary.exit_code())
}

/// File, then environment, then command line.
fn resolve_config(args: &RunArgs) -> Result<EngineConfig> {
    let env = EnvConfig::load();
    let path = args
        .config
        .clone()
        .or_else(|| env.config_file.as_ref().map(PathBuf::from));

    let mut config = ConfigFile::load_or_default(path.as_deref())?
        .engine
        .with_env(&env);

    if args.serial {
        config.force_serial = true;
    }
    if let Some(limit) = args.max_concurrent {
        config.max_concurrent = Some(limit);
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            output.display()
        );
    }

    ConfigFile::default().save(output)?;
    println!("Configuration file created: {}", output.display());
    Ok(())
}

fn list_specs() {
    let bundle = selfcheck::bundle();
    let mode = if bundle.is_parallel() {
        "parallel"
    } else {
        "serial"
    };

    println!("\nBundle {} ({} specs, {mode})\n", bundle.name(), bundle.len());
    for spec in bundle.specs() {
        let fixture = spec.fixture().map(|f| f.name()).unwrap_or("-");
        println!(
            "  {:20} options: {:24} fixture: {}",
            spec.name(),
            spec.options().flags(),
            fixture
        );
    }
    println!();
}
