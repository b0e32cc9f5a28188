//! Mirror sync engine
//!
//! Brings one mirror's local repository up to date with its source and pushes
//! the result to its destination:
//!
//! ```text
//! classify ─┬─ Uninitialized ─→ clone ─┐
//!           └─ Initialized ───→ fetch ─┴─→ set remote "mirror" ─→ push --mirror
//! ```
//!
//! Every step failure stops this mirror only and is returned inside the
//! [`SyncOutcome`]; nothing escapes to the caller.

use std::path::Path;
use tracing::{debug, info, warn};

use super::config::MIRROR_REMOTE_NAME;
use super::outcome::{SyncAction, SyncOutcome};
use super::state::{is_working_tree, FsStateDetector, RepoState, StateDetector};
use crate::config::Mirror;
use crate::errors::MirrorError;
use crate::git::RepoOps;

/// Syncs single mirrors using injected repository primitives and state detection
pub struct MirrorSyncEngine<O, D = FsStateDetector> {
    ops: O,
    detector: D,
}

impl<O: RepoOps> MirrorSyncEngine<O, FsStateDetector> {
    pub fn new(ops: O) -> Self {
        Self {
            ops,
            detector: FsStateDetector,
        }
    }
}

impl<O: RepoOps, D: StateDetector> MirrorSyncEngine<O, D> {
    pub fn with_detector(ops: O, detector: D) -> Self {
        Self { ops, detector }
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Syncs `mirror` through the local repository at `local_path`
    pub async fn sync(&self, configuration: &str, mirror: &Mirror, local_path: &Path) -> SyncOutcome {
        match self.sync_inner(mirror, local_path).await {
            Ok(action) => {
                info!(
                    configuration,
                    mirror = %mirror.name,
                    action = action.text(),
                    "mirror synced"
                );
                SyncOutcome::success(configuration, &mirror.name, local_path.to_path_buf(), action)
            }
            Err(error) => {
                warn!(
                    configuration,
                    mirror = %mirror.name,
                    kind = error.kind(),
                    %error,
                    "mirror sync failed"
                );
                SyncOutcome::failure(
                    configuration,
                    &mirror.name,
                    Some(local_path.to_path_buf()),
                    error,
                )
            }
        }
    }

    async fn sync_inner(&self, mirror: &Mirror, local_path: &Path) -> Result<SyncAction, MirrorError> {
        let action = match self.detector.classify(local_path) {
            RepoState::Uninitialized => {
                prepare_clone_target(local_path)?;
                debug!(src = %mirror.src, path = %local_path.display(), "cloning");
                self.ops
                    .clone_repo(&mirror.src, local_path)
                    .await
                    .map_err(MirrorError::Clone)?;
                SyncAction::Cloned
            }
            RepoState::Initialized => {
                debug!(path = %local_path.display(), "fetching");
                self.ops
                    .fetch(local_path)
                    .await
                    .map_err(MirrorError::Fetch)?;
                SyncAction::Updated
            }
        };

        self.ops
            .set_remote(local_path, MIRROR_REMOTE_NAME, &mirror.dest)
            .await
            .map_err(MirrorError::RemoteConfig)?;

        debug!(dest = %mirror.dest, "pushing mirror");
        self.ops
            .push_mirror(local_path, MIRROR_REMOTE_NAME)
            .await
            .map_err(MirrorError::Push)?;

        Ok(action)
    }
}

/// Makes `path` ready to be cloned into.
///
/// Creates the parent directory. A leftover empty directory (an interrupted
/// first run) is removed; anything else already at `path`, including a regular
/// checkout, is left untouched and reported as [`MirrorError::CorruptWorkspace`].
fn prepare_clone_target(path: &Path) -> Result<(), MirrorError> {
    let corrupt = |detail: String| MirrorError::CorruptWorkspace {
        path: path.to_path_buf(),
        detail,
    };

    match std::fs::symlink_metadata(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(corrupt(format!("cannot inspect: {e}"))),
        Ok(meta) if meta.is_dir() => {
            if is_working_tree(path) {
                return Err(corrupt(
                    "holds a working tree, not a mirror clone".to_string(),
                ));
            }
            let mut entries = std::fs::read_dir(path)
                .map_err(|e| corrupt(format!("cannot read directory: {e}")))?;
            if entries.next().is_some() {
                return Err(corrupt(
                    "directory is not empty and holds no repository".to_string(),
                ));
            }
            debug!(path = %path.display(), "removing empty leftover directory");
            std::fs::remove_dir(path)
                .map_err(|e| corrupt(format!("cannot remove empty directory: {e}")))?;
        }
        Ok(_) => return Err(corrupt("exists and is not a directory".to_string())),
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| corrupt(format!("cannot create parent directory: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every primitive call and fails the ones it is told to
    #[derive(Default)]
    struct FakeOps {
        calls: Mutex<Vec<String>>,
        failing: HashSet<&'static str>,
    }

    impl FakeOps {
        fn failing(op: &'static str) -> Self {
            Self {
                failing: HashSet::from([op]),
                ..Self::default()
            }
        }

        fn record(&self, op: &'static str, call: String) -> Result<(), GitError> {
            self.calls.lock().unwrap().push(call);
            if self.failing.contains(op) {
                Err(GitError::CommandFailed {
                    command: op.to_string(),
                    stderr: format!("fatal: {op} refused"),
                })
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RepoOps for FakeOps {
        async fn clone_repo(&self, src: &str, dest: &Path) -> Result<(), GitError> {
            self.record("clone", format!("clone {src} {}", dest.display()))
        }

        async fn fetch(&self, repo: &Path) -> Result<(), GitError> {
            self.record("fetch", format!("fetch {}", repo.display()))
        }

        async fn set_remote(&self, repo: &Path, remote: &str, url: &str) -> Result<(), GitError> {
            self.record("remote", format!("remote {} {remote} {url}", repo.display()))
        }

        async fn push_mirror(&self, repo: &Path, remote: &str) -> Result<(), GitError> {
            self.record("push", format!("push {} {remote}", repo.display()))
        }
    }

    struct FixedState(RepoState);

    impl StateDetector for FixedState {
        fn classify(&self, _path: &Path) -> RepoState {
            self.0
        }
    }

    fn mirror() -> Mirror {
        Mirror::new("Mira", "ssh://gitea/x.git", "git@github.com:x.git")
    }

    #[tokio::test]
    async fn test_uninitialized_clones_then_pushes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("G2G").join("Mira");
        let engine =
            MirrorSyncEngine::with_detector(FakeOps::default(), FixedState(RepoState::Uninitialized));

        let outcome = engine.sync("G2G", &mirror(), &path).await;

        assert!(matches!(outcome.result, Ok(SyncAction::Cloned)));
        assert_eq!(outcome.configuration, "G2G");
        assert_eq!(outcome.mirror, "Mira");
        let p = path.display();
        assert_eq!(
            engine.ops().calls(),
            vec![
                format!("clone ssh://gitea/x.git {p}"),
                format!("remote {p} mirror git@github.com:x.git"),
                format!("push {p} mirror"),
            ]
        );
        // Parent directory is created for the clone
        assert!(dir.path().join("G2G").is_dir());
    }

    #[tokio::test]
    async fn test_initialized_fetches_never_clones() {
        let dir = TempDir::new().unwrap();
        let engine =
            MirrorSyncEngine::with_detector(FakeOps::default(), FixedState(RepoState::Initialized));

        let outcome = engine.sync("G2G", &mirror(), dir.path()).await;

        assert!(matches!(outcome.result, Ok(SyncAction::Updated)));
        let calls = engine.ops().calls();
        assert!(calls[0].starts_with("fetch "));
        assert!(!calls.iter().any(|c| c.starts_with("clone ")));
        assert_eq!(calls.len(), 3);
    }

    #[tokio::test]
    async fn test_clone_failure_stops_before_remote() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Mira");
        let engine =
            MirrorSyncEngine::with_detector(FakeOps::failing("clone"), FixedState(RepoState::Uninitialized));

        let outcome = engine.sync("G2G", &mirror(), &path).await;

        assert!(matches!(outcome.error(), Some(MirrorError::Clone(_))));
        assert_eq!(engine.ops().calls().len(), 1);
        assert_eq!(outcome.path, Some(path));
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_before_remote() {
        let dir = TempDir::new().unwrap();
        let engine =
            MirrorSyncEngine::with_detector(FakeOps::failing("fetch"), FixedState(RepoState::Initialized));

        let outcome = engine.sync("G2G", &mirror(), dir.path()).await;

        assert!(matches!(outcome.error(), Some(MirrorError::Fetch(_))));
        assert_eq!(engine.ops().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_stops_before_push() {
        let dir = TempDir::new().unwrap();
        let engine =
            MirrorSyncEngine::with_detector(FakeOps::failing("remote"), FixedState(RepoState::Initialized));

        let outcome = engine.sync("G2G", &mirror(), dir.path()).await;

        assert!(matches!(outcome.error(), Some(MirrorError::RemoteConfig(_))));
        assert!(!engine.ops().calls().iter().any(|c| c.starts_with("push ")));
    }

    #[tokio::test]
    async fn test_push_failure_reported() {
        let dir = TempDir::new().unwrap();
        let engine =
            MirrorSyncEngine::with_detector(FakeOps::failing("push"), FixedState(RepoState::Initialized));

        let outcome = engine.sync("G2G", &mirror(), dir.path()).await;

        let error = outcome.error().unwrap();
        assert!(matches!(error, MirrorError::Push(_)));
        assert!(error.to_string().contains("push refused"));
    }

    #[tokio::test]
    async fn test_empty_leftover_directory_is_recloned() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Mira");
        std::fs::create_dir(&path).unwrap();
        let engine = MirrorSyncEngine::new(FakeOps::default());

        let outcome = engine.sync("G2G", &mirror(), &path).await;

        assert!(matches!(outcome.result, Ok(SyncAction::Cloned)));
        // Removed so the clone can create it
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_non_empty_unrecognized_directory_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Mira");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("stray.txt"), "keep me").unwrap();
        let engine = MirrorSyncEngine::new(FakeOps::default());

        let outcome = engine.sync("G2G", &mirror(), &path).await;

        assert!(matches!(outcome.error(), Some(MirrorError::CorruptWorkspace { .. })));
        assert!(engine.ops().calls().is_empty());
        assert!(path.join("stray.txt").exists());
    }

    #[tokio::test]
    async fn test_working_tree_checkout_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Mira");
        std::fs::create_dir_all(path.join(".git").join("objects")).unwrap();
        std::fs::create_dir_all(path.join(".git").join("refs")).unwrap();
        std::fs::write(path.join(".git").join("HEAD"), "ref: refs/heads/main\n").unwrap();
        std::fs::write(path.join("README.md"), "checked out").unwrap();
        let engine = MirrorSyncEngine::new(FakeOps::default());

        let outcome = engine.sync("G2G", &mirror(), &path).await;

        match outcome.error() {
            Some(MirrorError::CorruptWorkspace { detail, .. }) => {
                assert!(detail.contains("working tree"), "{detail}")
            }
            other => panic!("expected corrupt workspace, got {other:?}"),
        }
        // Neither fetched nor pushed, and the checkout is left alone
        assert!(engine.ops().calls().is_empty());
        assert!(path.join("README.md").exists());
    }

    #[tokio::test]
    async fn test_file_in_place_of_repository_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Mira");
        std::fs::write(&path, "not a repo").unwrap();
        let engine = MirrorSyncEngine::new(FakeOps::default());

        let outcome = engine.sync("G2G", &mirror(), &path).await;

        assert!(matches!(outcome.error(), Some(MirrorError::CorruptWorkspace { .. })));
        assert!(engine.ops().calls().is_empty());
    }

    #[tokio::test]
    async fn test_detector_decides_path() {
        // A real bare layout is classified Initialized by the default detector
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("Mira");
        std::fs::create_dir_all(path.join("objects")).unwrap();
        std::fs::create_dir_all(path.join("refs")).unwrap();
        std::fs::write(path.join("HEAD"), "ref: refs/heads/main\n").unwrap();
        let engine = MirrorSyncEngine::new(FakeOps::default());

        let outcome = engine.sync("G2G", &mirror(), &path).await;

        assert!(matches!(outcome.result, Ok(SyncAction::Updated)));
    }
}
