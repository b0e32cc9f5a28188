//! Configuration file loading
//!
//! The configuration names a workspace directory and an ordered list of
//! configurations, each holding an ordered list of mirrors. JSON is the
//! default format; files ending in `.toml` are read as TOML.
//!
//! ```json
//! {
//!   "workspace": "/var/lib/mira",
//!   "configurations": [
//!     {
//!       "name": "G2G",
//!       "mirrors": [
//!         { "name": "Mira", "src": "ssh://gitea/x.git", "dest": "git@github.com:x.git" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

/// Top-level configuration document.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    /// Directory holding one subdirectory per configuration.
    pub workspace: PathBuf,
    #[serde(default)]
    pub configurations: Vec<Configuration>,
}

/// A named group of mirrors.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub mirrors: Vec<Mirror>,
}

/// One source to destination replication unit.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Mirror {
    pub name: String,
    pub src: String,
    pub dest: String,
}

impl Mirror {
    pub fn new(name: impl Into<String>, src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            src: src.into(),
            dest: dest.into(),
        }
    }
}

impl Configuration {
    pub fn new(name: impl Into<String>, mirrors: Vec<Mirror>) -> Self {
        Self {
            name: name.into(),
            mirrors,
        }
    }
}

impl RootConfig {
    /// Parses a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Checks the structural rules that make a configuration unusable as a whole.
    ///
    /// Name safety and uniqueness are deliberately not checked here: those are
    /// reported per mirror by the run driver so one bad entry cannot stop the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workspace.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("workspace path is empty".to_string()));
        }
        for config in &self.configurations {
            for mirror in &config.mirrors {
                if mirror.src.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "mirror '{}' in configuration '{}' has an empty src",
                        mirror.name, config.name
                    )));
                }
                if mirror.dest.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "mirror '{}' in configuration '{}' has an empty dest",
                        mirror.name, config.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Total number of mirrors across all configurations
    pub fn mirror_count(&self) -> usize {
        self.configurations.iter().map(|c| c.mirrors.len()).sum()
    }
}

/// Returns true when the file should be parsed as TOML rather than JSON
fn is_toml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Reads, parses and validates a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<RootConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = if is_toml_path(path) {
        RootConfig::from_toml(&text)?
    } else {
        RootConfig::from_json(&text)?
    };
    config.validate()?;
    Ok(config)
}
