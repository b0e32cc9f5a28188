//! # mira
//!
//! `mira` mirrors Git repositories from one host to another, driven by a
//! declarative configuration file. It is meant to run unattended, for example
//! from a systemd timer, and keeps every branch and tag of each destination
//! identical to its source.
//!
//! ## How a run works
//!
//! - Every mirror owns a bare `--mirror` clone under
//!   `<workspace>/<configuration>/<mirror>`, kept between runs.
//! - The first run clones; later runs fetch (pruning deleted refs).
//! - A remote named `mirror` pointing at the destination is kept in sync with
//!   the configuration, then `git push --mirror` replicates every ref.
//! - A failing mirror is reported and skipped; the rest of the run continues.
//!
//! Credentials are never handled here: git uses whatever the environment
//! provides (SSH agent, credential helpers).
//!
//! ## Example
//!
//! ```rust,no_run
//! use mira::config::load_config;
//! use mira::core::{MirrorSyncEngine, NoProgress, RunDriver};
//! use mira::git::GitCli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("mira.json")?;
//!     let driver = RunDriver::new(MirrorSyncEngine::new(GitCli), 1);
//!     let report = driver
//!         .run(&config.workspace, &config.configurations, &NoProgress)
//!         .await?;
//!     println!("{}", report.generate_summary());
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod git;
pub mod utils;
