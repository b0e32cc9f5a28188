//! Mirror sync command implementation
//!
//! Loads the configuration file, runs every mirror through the sync engine
//! and prints per-configuration progress followed by a summary.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::config::{load_config, Configuration, Mirror};
use crate::core::{
    get_mirror_concurrency, MirrorSyncEngine, RunDriver, RunReport, SyncOutcome, SyncProgress,
    PROGRESS_TEMPLATE, PROGRESS_TICK_MILLIS,
};
use crate::git::GitCli;

/// Console output for a run: status lines, plus a spinner when attached to a terminal
struct ConsoleProgress {
    bar: ProgressBar,
    quiet: bool,
    /// Status lines interleave across configurations when mirrors run at once
    qualify_names: bool,
}

impl ConsoleProgress {
    fn new(total_mirrors: usize, quiet: bool, concurrency: usize) -> Result<Self> {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(total_mirrors as u64);
            bar.set_style(ProgressStyle::default_spinner().template(PROGRESS_TEMPLATE)?);
            bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MILLIS));
            bar
        };
        Ok(Self {
            bar,
            quiet,
            qualify_names: concurrency > 1,
        })
    }

    fn status_line(&self, outcome: &SyncOutcome) -> String {
        let name = if self.qualify_names {
            format!("{}/{}", outcome.configuration, outcome.mirror)
        } else {
            outcome.mirror.clone()
        };
        match outcome.error() {
            None => format!("   {} {} {}", outcome.symbol(), name, outcome.text()),
            Some(error) => format!("   {} {} {}: {}", outcome.symbol(), name, outcome.text(), error),
        }
    }

    /// Prints above the spinner, or straight to stdout when there is no terminal
    fn print(&self, line: String) {
        if self.quiet {
            return;
        }
        if self.bar.is_hidden() {
            println!("{line}");
        } else {
            self.bar.println(line);
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SyncProgress for ConsoleProgress {
    fn configuration_started(&self, configuration: &Configuration) {
        self.print(format!("Processing config {}.", configuration.name));
    }

    fn mirror_started(&self, configuration: &str, mirror: &Mirror) {
        self.bar
            .set_message(format!("{configuration}/{} syncing...", mirror.name));
    }

    fn mirror_finished(&self, outcome: &SyncOutcome) {
        let line = self.status_line(outcome);
        self.print(line);
        self.bar.inc(1);
    }
}

/// Prints the summary line and, when something failed, the list of failures
fn print_report(report: &RunReport) {
    println!();
    println!("{}", report.generate_summary());
    let detailed = report.generate_detailed_summary();
    if !detailed.is_empty() {
        println!();
        println!("{detailed}");
    }
}

/// Handles the mirror sync command
///
/// Returns `Ok(true)` when every mirror synced, `Ok(false)` when at least one
/// failed, and `Err` for fatal problems (unreadable configuration, unusable
/// workspace) detected before any mirror was processed.
pub async fn handle_sync_command(
    config_path: &Path,
    jobs: Option<usize>,
    sequential: bool,
    quiet: bool,
) -> Result<bool> {
    let root_config = load_config(config_path)
        .with_context(|| format!("Failed to load configuration {}", config_path.display()))?;

    let concurrency = get_mirror_concurrency(jobs, sequential);
    let driver = RunDriver::new(MirrorSyncEngine::new(GitCli), concurrency);
    let progress = ConsoleProgress::new(root_config.mirror_count(), quiet, concurrency)?;

    let result = driver
        .run(&root_config.workspace, &root_config.configurations, &progress)
        .await;
    progress.finish();

    let report = result.context("Failed to prepare workspace")?;
    print_report(&report);
    Ok(report.is_success())
}
