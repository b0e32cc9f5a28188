//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{SourceRepo, TestWorkspace};
pub use self::git::{git, is_git_available, list_refs};
