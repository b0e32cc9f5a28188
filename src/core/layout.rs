//! Workspace layout: where each mirror's local repository lives
//!
//! Every mirror gets `<workspace>/<configuration>/<mirror>`. Both names are
//! used verbatim as directory segments, so anything that could escape the
//! workspace or alias another entry is rejected up front.

use std::path::{Component, Path, PathBuf};

use crate::errors::MirrorError;

/// Checks that `name` is usable as exactly one directory segment
pub fn validate_name(name: &str) -> Result<(), MirrorError> {
    if name.is_empty() {
        return Err(MirrorError::invalid_name(name, "name is empty"));
    }
    if name.trim() != name {
        return Err(MirrorError::invalid_name(
            name,
            "leading or trailing whitespace",
        ));
    }
    if name.contains("..") {
        return Err(MirrorError::invalid_name(name, "contains '..'"));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(MirrorError::invalid_name(
            name,
            format!("contains forbidden character {c:?}"),
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(MirrorError::invalid_name(name, "contains control characters"));
    }

    // "." and platform prefixes ("C:") slip past the character checks above.
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(MirrorError::invalid_name(
            name,
            "not a single plain path segment",
        )),
    }
}

/// Computes the local repository path for a mirror.
///
/// Pure function of its inputs: no filesystem access. Fails with
/// [`MirrorError::InvalidName`] if either name is unsafe.
pub fn resolve_path(
    workspace: &Path,
    configuration_name: &str,
    mirror_name: &str,
) -> Result<PathBuf, MirrorError> {
    validate_name(configuration_name)?;
    validate_name(mirror_name)?;
    Ok(workspace.join(configuration_name).join(mirror_name))
}
