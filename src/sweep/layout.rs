// src/sweep/layout.rs

//! On-disk layout of a mods root
//!
//! Every installed mod owns two artifacts directly under the root, both named
//! by its on-disk key: a folder `<key>/` and a descriptor `<key>.manifest`.

use std::path::{Component, Path, PathBuf};

/// Suffix of the per-mod descriptor file
pub const DESCRIPTOR_SUFFIX: &str = ".manifest";

/// Resolves on-disk keys to artifact paths under a mods root
#[derive(Debug, Clone)]
pub struct ModLayout {
    root: PathBuf,
}

impl ModLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder and descriptor paths for `key`
    ///
    /// Returns an error message if `key` could resolve outside the root.
    pub fn artifacts(&self, key: &str) -> Result<(PathBuf, PathBuf), String> {
        validate_key(key)?;
        Ok((
            self.root.join(key),
            self.root.join(format!("{}{}", key, DESCRIPTOR_SUFFIX)),
        ))
    }
}

/// An on-disk key must be exactly one normal path component
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("empty on-disk key".to_string());
    }
    if key.contains('/') || key.contains('\\') {
        return Err(format!("on-disk key '{}' contains a path separator", key));
    }

    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(format!("on-disk key '{}' is not a plain file name", key)),
    }
}
