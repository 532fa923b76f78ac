//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Minimal spec engine with serial and parallel bundles
#[derive(Parser, Debug)]
#[command(name = "chlorine")]
#[command(version)]
#[command(about = "Run spec bundles serially or in parallel")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the self-check bundle
    Run(RunArgs),

    /// List specs in the self-check bundle
    List,

    /// Show supported environment variables
    Env,

    /// Write a default configuration file
    Init {
        /// Output file (yaml or json)
        #[arg(short, long, default_value = "chlorine.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Run parallel bundles serially
    #[arg(short, long)]
    pub serial: bool,

    /// Maximum specs running at once in a parallel bundle
    #[arg(short = 'j', long)]
    pub max_concurrent: Option<usize>,

    /// Configuration file (yaml or json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Diagnostic log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Omit timings from the report
    #[arg(long)]
    pub no_timings: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let args = Args::parse_from(["chlorine", "run", "--serial", "-j", "4"]);
        match args.command {
            Command::Run(run) => {
                assert!(run.serial);
                assert_eq!(run.max_concurrent, Some(4));
                assert!(run.config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let args = Args::parse_from(["chlorine", "list", "--verbose"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Command::List));
    }

    #[test]
    fn test_parse_init_defaults() {
        let args = Args::parse_from(["chlorine", "init"]);
        match args.command {
            Command::Init { output, force } => {
                assert_eq!(output, PathBuf::from("chlorine.yaml"));
                assert!(!force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_limit() {
        assert!(Args::try_parse_from(["chlorine", "run", "-j", "many"]).is_err());
    }
}
