//! mira: mirror Git repositories described in a configuration file
//!
//! Exit status is 0 when every mirror synced and 1 otherwise.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mira::commands::sync::handle_sync_command;

#[derive(Parser, Debug)]
#[command(name = "mira", version, about = "Mirror Git repositories from a config file")]
struct Cli {
    /// Path to the JSON (or .toml) configuration file
    #[arg(short, long, value_name = "PATH")]
    config: PathBuf,

    /// Number of mirrors to sync at once (0 = automatic)
    #[arg(short, long, value_name = "N", env = "MIRA_JOBS")]
    jobs: Option<usize>,

    /// Sync one mirror at a time (the default); overrides --jobs and MIRA_JOBS
    #[arg(long)]
    sequential: bool,

    /// Show debug logs, including every git invocation
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors and the final summary
    #[arg(short, long)]
    quiet: bool,
}

/// Logs go to stderr; RUST_LOG overrides the level picked from the flags
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "mira=debug"
    } else if quiet {
        "mira=error"
    } else {
        "mira=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match handle_sync_command(&cli.config, cli.jobs, cli.sequential, cli.quiet).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
