//! Git primitives used by the sync engine, and their `git` subprocess implementation

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::core::config::GIT_OPERATION_TIMEOUT_SECS;
use crate::core::config::SOURCE_REMOTE_NAME;
use crate::errors::GitError;

// Git command arguments
const GIT_CLONE_MIRROR_ARGS: &[&str] = &["clone", "--mirror", "--quiet"];
const GIT_FETCH_PRUNE_ARGS: &[&str] = &["fetch", "--prune", "--quiet"];
const GIT_REMOTE_ARGS: &[&str] = &["remote"];
const GIT_PUSH_MIRROR_ARGS: &[&str] = &["push", "--mirror", "--quiet"];

/// The repository primitives the sync engine needs.
///
/// Each call either succeeds or returns a descriptive [`GitError`]; the
/// engine only branches on which one it got.
#[async_trait]
pub trait RepoOps: Send + Sync {
    /// Clones `src` into `dest`, which must not exist yet
    async fn clone_repo(&self, src: &str, dest: &Path) -> Result<(), GitError>;

    /// Brings new history from the source remote into the repository at `repo`
    async fn fetch(&self, repo: &Path) -> Result<(), GitError>;

    /// Makes `remote` exist in `repo` with exactly `url`
    async fn set_remote(&self, repo: &Path, remote: &str, url: &str) -> Result<(), GitError>;

    /// Pushes every ref of `repo` to `remote`, deleting refs the remote has and `repo` lacks
    async fn push_mirror(&self, repo: &Path, remote: &str) -> Result<(), GitError>;
}

/// Runs a git command in the specified directory with a timeout
/// Returns (success, stdout, stderr)
pub async fn run_git(path: &Path, args: &[&str]) -> Result<(bool, String, String), GitError> {
    let timeout_duration = Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS);
    debug!(path = %path.display(), args = ?args, "running git");

    let result = tokio::time::timeout(
        timeout_duration,
        Command::new("git")
            .args(args)
            .current_dir(path)
            // Never block on an interactive credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output(),
    )
    .await;

    match result {
        Ok(Ok(output)) => Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        )),
        Ok(Err(e)) => Err(GitError::Spawn(e)),
        Err(_) => Err(GitError::Timeout {
            command: command_name(args),
            seconds: GIT_OPERATION_TIMEOUT_SECS,
        }),
    }
}

/// Runs git and turns a non-zero exit into [`GitError::CommandFailed`]
async fn run_git_checked(path: &Path, args: &[&str]) -> Result<String, GitError> {
    let (success, stdout, stderr) = run_git(path, args).await?;
    if success {
        Ok(stdout)
    } else {
        debug!(path = %path.display(), %stderr, "git command failed");
        Err(GitError::CommandFailed {
            command: command_name(args),
            stderr: clean_stderr(&stderr),
        })
    }
}

fn command_name(args: &[&str]) -> String {
    args.first().copied().unwrap_or("git").to_string()
}

/// Reduces git's stderr to the lines that explain the failure
///
/// Prefers `fatal:`/`error:` lines, falling back to the last non-empty line.
pub fn clean_stderr(stderr: &str) -> String {
    let relevant: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("fatal:") || line.starts_with("error:"))
        .collect();
    if !relevant.is_empty() {
        return relevant.join("; ");
    }
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or("no error output")
        .to_string()
}

/// Returns the remote names configured in `repo`
pub async fn list_remotes(repo: &Path) -> Result<Vec<String>, GitError> {
    let stdout = run_git_checked(repo, GIT_REMOTE_ARGS).await?;
    Ok(stdout.split_whitespace().map(str::to_string).collect())
}

/// Returns the URL of `remote` in `repo`
pub async fn get_remote_url(repo: &Path, remote: &str) -> Result<String, GitError> {
    run_git_checked(repo, &["remote", "get-url", remote]).await
}

/// [`RepoOps`] backed by the `git` command line
///
/// Clones are bare `--mirror` clones, so the local repository carries every
/// ref of the source and `fetch --prune` keeps them exact.
#[derive(Clone, Copy, Debug, Default)]
pub struct GitCli;

#[async_trait]
impl RepoOps for GitCli {
    async fn clone_repo(&self, src: &str, dest: &Path) -> Result<(), GitError> {
        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let dir_name = dest
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| GitError::InvalidPath(dest.to_path_buf()))?;

        let mut args = Vec::from(GIT_CLONE_MIRROR_ARGS);
        args.push("--");
        args.push(src);
        args.push(dir_name);
        run_git_checked(parent, &args).await.map(|_| ())
    }

    async fn fetch(&self, repo: &Path) -> Result<(), GitError> {
        let mut args = Vec::from(GIT_FETCH_PRUNE_ARGS);
        args.push(SOURCE_REMOTE_NAME);
        run_git_checked(repo, &args).await.map(|_| ())
    }

    async fn set_remote(&self, repo: &Path, remote: &str, url: &str) -> Result<(), GitError> {
        let remotes = list_remotes(repo).await?;
        if !remotes.iter().any(|name| name == remote) {
            debug!(repo = %repo.display(), remote, url, "adding remote");
            return run_git_checked(repo, &["remote", "add", remote, url])
                .await
                .map(|_| ());
        }

        let current = get_remote_url(repo, remote).await?;
        if current == url {
            return Ok(());
        }
        debug!(repo = %repo.display(), remote, from = %current, to = url, "updating remote url");
        run_git_checked(repo, &["remote", "set-url", remote, url])
            .await
            .map(|_| ())
    }

    async fn push_mirror(&self, repo: &Path, remote: &str) -> Result<(), GitError> {
        let mut args = Vec::from(GIT_PUSH_MIRROR_ARGS);
        args.push(remote);
        run_git_checked(repo, &args).await.map(|_| ())
    }
}
