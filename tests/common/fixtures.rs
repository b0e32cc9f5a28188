//! Test fixtures: a scratch directory with source repositories, destinations and a workspace

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::git::{create_test_commit, git, setup_bare_repo, setup_git_repo};

/// A source repository with a working tree, standing in for the upstream host
pub struct SourceRepo {
    pub path: PathBuf,
}

impl SourceRepo {
    pub fn url(&self) -> String {
        self.path.display().to_string()
    }

    pub fn commit(&self, file_name: &str, content: &str, message: &str) -> Result<()> {
        create_test_commit(&self.path, file_name, content, message)
    }

    pub fn create_branch(&self, name: &str) -> Result<()> {
        git(&self.path, &["branch", name])?;
        Ok(())
    }

    pub fn delete_branch(&self, name: &str) -> Result<()> {
        git(&self.path, &["branch", "-D", name])?;
        Ok(())
    }

    pub fn create_tag(&self, name: &str) -> Result<()> {
        git(&self.path, &["tag", name])?;
        Ok(())
    }

    pub fn delete_tag(&self, name: &str) -> Result<()> {
        git(&self.path, &["tag", "-d", name])?;
        Ok(())
    }
}

/// Scratch directory holding sources, destinations and the mirror workspace
pub struct TestWorkspace {
    pub temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where mirror clones are kept
    pub fn workspace(&self) -> PathBuf {
        self.root().join("workspace")
    }

    /// Creates a source repository with one commit, a `feature` branch and a `v1` tag
    pub fn source(&self, name: &str) -> Result<SourceRepo> {
        let path = self.root().join("sources").join(name);
        std::fs::create_dir_all(&path)?;
        setup_git_repo(&path)?;

        let repo = SourceRepo { path };
        repo.commit("README.md", &format!("# {name}"), "Initial commit")?;
        repo.create_branch("feature")?;
        repo.create_tag("v1")?;
        Ok(repo)
    }

    /// Creates an empty bare destination repository and returns its URL
    pub fn destination(&self, name: &str) -> Result<String> {
        let path = self.root().join("destinations").join(format!("{name}.git"));
        setup_bare_repo(&path)?;
        Ok(path.display().to_string())
    }
}
