//! Public API for the core module.
//!
//! This module provides the stable public API for mirror synchronization:
//! - Workspace layout resolution
//! - Local repository state detection
//! - The per-mirror sync engine and the run driver
//! - Outcomes and run reports
//!
//! Internal implementation details are not exposed through this API.

// Layout and state
pub use super::layout::{resolve_path, validate_name};
pub use super::state::{is_repository, is_working_tree, FsStateDetector, RepoState, StateDetector};

// Sync engine and driver
pub use super::driver::{ensure_workspace, NoProgress, RunDriver, SyncProgress};
pub use super::engine::MirrorSyncEngine;

// Results
pub use super::outcome::{SyncAction, SyncOutcome};
pub use super::report::RunReport;

// Configuration
pub use super::config::{get_mirror_concurrency, MAX_JOBS, MIRROR_REMOTE_NAME, SOURCE_REMOTE_NAME};

// Internal helpers for command modules
pub(crate) use super::config::{PROGRESS_TEMPLATE, PROGRESS_TICK_MILLIS};
