//! Local repository state detection
//!
//! Decides whether a mirror's local directory already holds a repository
//! (fetch) or still needs a clone.

use std::path::Path;

/// Whether a mirror's local repository is ready to be fetched into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepoState {
    /// Nothing usable on disk yet; the mirror must be cloned
    Uninitialized,
    /// A repository exists; the mirror is updated with a fetch
    Initialized,
}

/// Classifies a local path. Implementations must not modify the filesystem.
pub trait StateDetector: Send + Sync {
    fn classify(&self, path: &Path) -> RepoState;
}

/// Detects repositories by looking for git's on-disk markers
#[derive(Clone, Copy, Debug, Default)]
pub struct FsStateDetector;

impl StateDetector for FsStateDetector {
    fn classify(&self, path: &Path) -> RepoState {
        if is_repository(path) {
            RepoState::Initialized
        } else {
            RepoState::Uninitialized
        }
    }
}

/// Returns true for a bare repository (`HEAD`, `objects/` and `refs/`), the
/// layout `clone --mirror` creates.
///
/// A checkout with a `.git` entry is not a mirror: its branches live under
/// `refs/remotes`, so pushing it with `--mirror` would not reproduce the source.
pub fn is_repository(path: &Path) -> bool {
    path.is_dir()
        && path.join("HEAD").is_file()
        && path.join("objects").is_dir()
        && path.join("refs").is_dir()
}

/// Returns true when `path` is a working tree rather than a mirror clone
pub fn is_working_tree(path: &Path) -> bool {
    path.is_dir() && path.join(".git").exists()
}
