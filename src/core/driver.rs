//! Configuration run driver
//!
//! Walks every configuration and mirror in input order, resolves each
//! mirror's local path, syncs it and collects one [`SyncOutcome`] per mirror.
//! A failing mirror never stops the others; only an unusable workspace root
//! aborts the run, and that is detected before any mirror is touched.

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use super::engine::MirrorSyncEngine;
use super::layout::resolve_path;
use super::outcome::SyncOutcome;
use super::report::RunReport;
use super::state::{FsStateDetector, StateDetector};
use crate::config::{Configuration, Mirror};
use crate::errors::MirrorError;
use crate::git::RepoOps;

const WRITE_PROBE_NAME: &str = ".mira-write-check";

/// Observer for run progress. All methods default to doing nothing.
pub trait SyncProgress: Send + Sync {
    fn configuration_started(&self, _configuration: &Configuration) {}
    fn mirror_started(&self, _configuration: &str, _mirror: &Mirror) {}
    fn mirror_finished(&self, _outcome: &SyncOutcome) {}
}

/// Progress observer that ignores everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl SyncProgress for NoProgress {}

/// One unit of work: a mirror with its resolved path, or the reason it has none
struct MirrorJob<'a> {
    index: usize,
    config_index: usize,
    configuration: &'a str,
    mirror: &'a Mirror,
    path: Result<PathBuf, MirrorError>,
}

/// Runs the sync engine over a whole configuration set
pub struct RunDriver<O, D = FsStateDetector> {
    engine: MirrorSyncEngine<O, D>,
    jobs: usize,
}

impl<O: RepoOps, D: StateDetector> RunDriver<O, D> {
    /// `jobs` is the maximum number of mirrors synced at once; 1 is strictly sequential
    pub fn new(engine: MirrorSyncEngine<O, D>, jobs: usize) -> Self {
        Self {
            engine,
            jobs: jobs.max(1),
        }
    }

    pub fn engine(&self) -> &MirrorSyncEngine<O, D> {
        &self.engine
    }

    /// Syncs every mirror under `workspace`.
    ///
    /// Returns `Err` only when the workspace root cannot be created or written.
    pub async fn run(
        &self,
        workspace: &Path,
        configurations: &[Configuration],
        progress: &dyn SyncProgress,
    ) -> Result<RunReport, MirrorError> {
        let start_time = Instant::now();
        ensure_workspace(workspace)?;

        let jobs = plan_jobs(workspace, configurations);
        info!(
            workspace = %workspace.display(),
            mirrors = jobs.len(),
            jobs = self.jobs,
            "starting mirror run"
        );

        let outcomes = if self.jobs == 1 {
            self.run_sequential(configurations, jobs, progress).await
        } else {
            self.run_concurrent(configurations, jobs, progress).await
        };

        Ok(RunReport::new(outcomes, start_time.elapsed()))
    }

    async fn run_sequential(
        &self,
        configurations: &[Configuration],
        jobs: Vec<MirrorJob<'_>>,
        progress: &dyn SyncProgress,
    ) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::with_capacity(jobs.len());
        let mut jobs = jobs.into_iter().peekable();

        for (config_index, configuration) in configurations.iter().enumerate() {
            info!(configuration = %configuration.name, "processing configuration");
            progress.configuration_started(configuration);

            while let Some(job) = jobs.next_if(|job| job.config_index == config_index) {
                let outcome = self.sync_job(job, progress).await;
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    async fn run_concurrent(
        &self,
        configurations: &[Configuration],
        jobs: Vec<MirrorJob<'_>>,
        progress: &dyn SyncProgress,
    ) -> Vec<SyncOutcome> {
        for configuration in configurations {
            info!(configuration = %configuration.name, "processing configuration");
            progress.configuration_started(configuration);
        }

        let semaphore = tokio::sync::Semaphore::new(self.jobs);
        let mut pending = FuturesUnordered::new();
        for job in jobs {
            let semaphore = &semaphore;
            pending.push(async move {
                // The semaphore is never closed, so acquiring cannot fail
                let _permit = semaphore.acquire().await.ok();
                let index = job.index;
                (index, self.sync_job(job, progress).await)
            });
        }

        let mut finished = Vec::new();
        while let Some(result) = pending.next().await {
            finished.push(result);
        }

        // Completion order is arbitrary; report in input order
        finished.sort_by_key(|(index, _)| *index);
        finished.into_iter().map(|(_, outcome)| outcome).collect()
    }

    async fn sync_job(&self, job: MirrorJob<'_>, progress: &dyn SyncProgress) -> SyncOutcome {
        progress.mirror_started(job.configuration, job.mirror);
        let outcome = match job.path {
            Ok(path) => self.engine.sync(job.configuration, job.mirror, &path).await,
            Err(error) => {
                debug!(
                    configuration = job.configuration,
                    mirror = %job.mirror.name,
                    %error,
                    "skipping mirror"
                );
                SyncOutcome::failure(job.configuration, &job.mirror.name, None, error)
            }
        };
        progress.mirror_finished(&outcome);
        outcome
    }
}

/// Resolves every mirror's path and flags name collisions.
///
/// The first occurrence of a name wins; later duplicates fail with
/// [`MirrorError::InvalidName`]. Names are compared case-insensitively so two
/// entries can never alias on a case-insensitive filesystem.
fn plan_jobs<'a>(workspace: &Path, configurations: &'a [Configuration]) -> Vec<MirrorJob<'a>> {
    let mut jobs = Vec::new();
    let mut seen_configurations: HashMap<String, &str> = HashMap::new();

    for (config_index, configuration) in configurations.iter().enumerate() {
        let configuration_clash = claim_name(&mut seen_configurations, &configuration.name);
        let mut seen_mirrors: HashMap<String, &str> = HashMap::new();

        for mirror in &configuration.mirrors {
            let mirror_clash = claim_name(&mut seen_mirrors, &mirror.name);
            let path = if let Some(first) = configuration_clash {
                Err(MirrorError::invalid_name(
                    &configuration.name,
                    clash_reason("configuration", first, &configuration.name, None),
                ))
            } else if let Some(first) = mirror_clash {
                Err(MirrorError::invalid_name(
                    &mirror.name,
                    clash_reason("mirror", first, &mirror.name, Some(&configuration.name)),
                ))
            } else {
                resolve_path(workspace, &configuration.name, &mirror.name)
            };

            jobs.push(MirrorJob {
                index: jobs.len(),
                config_index,
                configuration: &configuration.name,
                mirror,
                path,
            });
        }
    }
    jobs
}

/// Records `name`, returning the earlier name it collides with, if any
fn claim_name<'a>(seen: &mut HashMap<String, &'a str>, name: &'a str) -> Option<&'a str> {
    match seen.entry(name.to_lowercase()) {
        Entry::Occupied(first) => Some(*first.get()),
        Entry::Vacant(slot) => {
            slot.insert(name);
            None
        }
    }
}

fn clash_reason(kind: &str, first: &str, name: &str, within: Option<&str>) -> String {
    let scope = within
        .map(|configuration| format!(" in configuration '{configuration}'"))
        .unwrap_or_default();
    if first == name {
        format!("duplicate {kind} name{scope}")
    } else {
        format!("{kind} name differs only by case from '{first}'{scope}")
    }
}

/// Creates the workspace root if needed and checks that it is writable
pub fn ensure_workspace(workspace: &Path) -> Result<(), MirrorError> {
    let fail = |source: std::io::Error| MirrorError::Workspace {
        path: workspace.to_path_buf(),
        source,
    };

    if !workspace.is_dir() {
        std::fs::create_dir_all(workspace).map_err(fail)?;
    }

    let probe = workspace.join(WRITE_PROBE_NAME);
    std::fs::write(&probe, b"").map_err(fail)?;
    std::fs::remove_file(&probe).map_err(fail)?;
    Ok(())
}
