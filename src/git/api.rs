//! Public API for git operations.
//!
//! This module provides the repository primitives the sync engine is built on:
//! - The [`RepoOps`] capability trait
//! - [`GitCli`], its implementation on top of the `git` command line
//!
//! ## Example: Mirroring one repository by hand
//!
//! ```rust,no_run
//! use mira::git::{GitCli, RepoOps};
//! use std::path::Path;
//!
//! async fn mirror(src: &str, dest: &str) {
//!     let path = Path::new("/tmp/mira/manual/repo");
//!     let git = GitCli;
//!     if git.clone_repo(src, path).await.is_ok() {
//!         let _ = git.set_remote(path, "mirror", dest).await;
//!         let _ = git.push_mirror(path, "mirror").await;
//!     }
//! }
//! ```

// Capability trait and subprocess implementation
pub use super::operations::{GitCli, RepoOps};

// Lower-level helpers, used by integration tests
pub use super::operations::{clean_stderr, get_remote_url, list_remotes, run_git};
