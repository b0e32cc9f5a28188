//! Configuration constants and settings

// Name of the remote pointing at the mirror destination inside each local repository
pub const MIRROR_REMOTE_NAME: &str = "mirror";

// Name of the remote created by the initial clone
pub const SOURCE_REMOTE_NAME: &str = "origin";

// Mirrors of large repositories can take a while on the first clone
pub const GIT_OPERATION_TIMEOUT_SECS: u64 = 600;

// Concurrency Configuration
//
// Sequential processing is the default. Each mirror is network and disk bound, so
// running more than a handful at once mostly competes for the same uplink.
pub const DEFAULT_JOBS: usize = 1;
pub const MAX_JOBS: usize = 16;

/// Determines how many mirrors may sync at once
///
/// Priority order:
/// 1. --sequential flag → 1
/// 2. --jobs 0 → min(CPU_CORES + 2, MAX_JOBS)
/// 3. --jobs N flag (or MIRA_JOBS) → N, capped at MAX_JOBS
/// 4. Default → 1
pub fn get_mirror_concurrency(jobs: Option<usize>, sequential: bool) -> usize {
    if sequential {
        return 1;
    }
    match jobs {
        Some(0) => auto_jobs(),
        Some(n) => n.min(MAX_JOBS),
        None => DEFAULT_JOBS,
    }
}

fn auto_jobs() -> usize {
    (num_cpus::get() + 2).min(MAX_JOBS)
}

// Progress bar configuration
pub const PROGRESS_TEMPLATE: &str = "{spinner} [{pos}/{len}] {wide_msg}";
pub const PROGRESS_TICK_MILLIS: u64 = 120;

// Display formatting constants
pub const PATH_DISPLAY_WIDTH: usize = 40;
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 120;
