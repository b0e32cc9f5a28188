//! Error types for mirror synchronization.
//!
//! [`GitError`] describes a failed git primitive, [`MirrorError`] is the
//! per-mirror failure kind recorded in a [`crate::core::SyncOutcome`], and
//! [`ConfigError`] covers loading the configuration file. Only
//! [`MirrorError::Workspace`] and [`ConfigError`] abort a run.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Git primitives
// ---------------------------------------------------------------------------

/// Errors from running the `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` process could not be started at all.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// The operation exceeded its time budget and was abandoned.
    #[error("git {command} timed out after {seconds} seconds")]
    Timeout { command: String, seconds: u64 },

    /// `git` exited with a non-zero status.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// A path could not be handed to git (not valid UTF-8).
    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

// ---------------------------------------------------------------------------
// Per-mirror failures
// ---------------------------------------------------------------------------

/// Why a single mirror could not be synchronized.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A configuration or mirror name is unsafe as a directory segment, or
    /// collides with a sibling.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The local directory exists but is not a usable repository.
    #[error("corrupt workspace at '{}': {detail}", path.display())]
    CorruptWorkspace { path: PathBuf, detail: String },

    #[error("clone failed: {0}")]
    Clone(#[source] GitError),

    #[error("fetch failed: {0}")]
    Fetch(#[source] GitError),

    #[error("remote configuration failed: {0}")]
    RemoteConfig(#[source] GitError),

    #[error("push failed: {0}")]
    Push(#[source] GitError),

    /// The workspace root is missing and cannot be created, or is read-only.
    #[error("workspace '{}' is unusable: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MirrorError {
    pub(crate) fn invalid_name(name: &str, reason: impl Into<String>) -> Self {
        MirrorError::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Short label for the failure kind, used in summaries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MirrorError::InvalidName { .. } => "invalid-name",
            MirrorError::CorruptWorkspace { .. } => "corrupt-workspace",
            MirrorError::Clone(_) => "clone",
            MirrorError::Fetch(_) => "fetch",
            MirrorError::RemoteConfig(_) => "remote",
            MirrorError::Push(_) => "push",
            MirrorError::Workspace { .. } => "workspace",
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Errors from loading the configuration file. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The document parsed but violates a structural rule.
    #[error("invalid config: {0}")]
    Invalid(String),
}
