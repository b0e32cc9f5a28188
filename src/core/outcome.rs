//! Per-mirror sync results

use std::path::PathBuf;

use crate::errors::MirrorError;

/// What a successful sync had to do to bring the local repository up to date
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncAction {
    /// First run: the source was cloned
    Cloned,
    /// Steady state: the existing copy was fetched into
    Updated,
}

impl SyncAction {
    /// Returns the text representation of this action
    pub fn text(&self) -> &'static str {
        match self {
            SyncAction::Cloned => "cloned",
            SyncAction::Updated => "updated",
        }
    }
}

/// Result of syncing one mirror
#[derive(Debug)]
pub struct SyncOutcome {
    pub configuration: String,
    pub mirror: String,
    /// Local repository path, absent when the names could not be resolved
    pub path: Option<PathBuf>,
    pub result: Result<SyncAction, MirrorError>,
}

impl SyncOutcome {
    pub fn success(
        configuration: impl Into<String>,
        mirror: impl Into<String>,
        path: PathBuf,
        action: SyncAction,
    ) -> Self {
        Self {
            configuration: configuration.into(),
            mirror: mirror.into(),
            path: Some(path),
            result: Ok(action),
        }
    }

    pub fn failure(
        configuration: impl Into<String>,
        mirror: impl Into<String>,
        path: Option<PathBuf>,
        error: MirrorError,
    ) -> Self {
        Self {
            configuration: configuration.into(),
            mirror: mirror.into(),
            path,
            result: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&MirrorError> {
        self.result.as_ref().err()
    }

    /// Returns the emoji symbol for this outcome
    pub fn symbol(&self) -> &'static str {
        if self.is_success() {
            "🟢"
        } else {
            "🔴"
        }
    }

    /// Returns the text representation of this outcome
    pub fn text(&self) -> &'static str {
        match &self.result {
            Ok(action) => action.text(),
            Err(_) => "failed",
        }
    }

    /// Sort key giving reports a stable order regardless of completion order
    pub(crate) fn sort_key(&self) -> (&str, &str) {
        (&self.configuration, &self.mirror)
    }
}
