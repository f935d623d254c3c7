// src/sweep/executor.rs

//! Deletion of candidate artifacts
//!
//! Each candidate is removed independently. A failure is recorded in that
//! candidate's [`DeletionOutcome`] and the batch moves on to the next one.
//! Artifacts that are already gone count as removed.

use super::layout::ModLayout;
use crate::snapshot::models::InstalledItem;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Filesystem operations used to remove artifacts
pub trait Remover {
    /// Recursively remove a directory
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a single file
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Removes artifacts from the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Result of attempting to remove one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub candidate: InstalledItem,
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

impl DeletionOutcome {
    fn success(candidate: &InstalledItem) -> Self {
        Self {
            candidate: candidate.clone(),
            succeeded: true,
            error_detail: None,
        }
    }

    fn failure(candidate: &InstalledItem, detail: String) -> Self {
        Self {
            candidate: candidate.clone(),
            succeeded: false,
            error_detail: Some(detail),
        }
    }
}

/// Whether the executor ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// Confirmation was not given; nothing was touched
    Declined,
    /// One outcome per candidate, in candidate order
    Completed(Vec<DeletionOutcome>),
}

/// A response confirms only if it is a single `y` or `Y`
pub fn is_affirmative(response: &str) -> bool {
    matches!(response.trim_end_matches(['\r', '\n']), "y" | "Y")
}

/// Remove every candidate's artifacts, provided `confirmed` is set
///
/// Candidates whose on-disk key appears in `protected_keys` are not touched
/// and are reported as failed.
pub fn execute<R: Remover + ?Sized>(
    layout: &ModLayout,
    candidates: &[InstalledItem],
    protected_keys: &BTreeSet<String>,
    confirmed: bool,
    remover: &R,
) -> Execution {
    if !confirmed {
        info!("Deletion not confirmed, leaving {} mod(s) in place", candidates.len());
        return Execution::Declined;
    }

    let mut outcomes = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let outcome = match remove_candidate(layout, candidate, protected_keys, remover) {
            Ok(()) => DeletionOutcome::success(candidate),
            Err(detail) => {
                warn!(
                    "Failed to delete mod {} ({}): {}",
                    candidate.identifier, candidate.on_disk_key, detail
                );
                DeletionOutcome::failure(candidate, detail)
            }
        };
        outcomes.push(outcome);
    }

    let failed = outcomes.iter().filter(|o| !o.succeeded).count();
    info!(
        "Deletion finished: {} removed, {} failed",
        outcomes.len() - failed,
        failed
    );
    Execution::Completed(outcomes)
}

fn remove_candidate<R: Remover + ?Sized>(
    layout: &ModLayout,
    candidate: &InstalledItem,
    protected_keys: &BTreeSet<String>,
    remover: &R,
) -> Result<(), String> {
    let key = &candidate.on_disk_key;
    if protected_keys.contains(key) {
        return Err(format!("on-disk key '{}' is shared with a subscribed mod", key));
    }

    let (folder, descriptor) = layout.artifacts(key)?;

    if absent_ok(remover.remove_dir_all(&folder))
        .map_err(|e| format!("removing folder {}: {}", folder.display(), e))?
    {
        info!("Deleted folder: {}", key);
    }

    if absent_ok(remover.remove_file(&descriptor))
        .map_err(|e| format!("removing descriptor {}: {}", descriptor.display(), e))?
    {
        info!("Deleted manifest: {}", descriptor.display());
    }

    Ok(())
}

/// `Ok(true)` if something was removed, `Ok(false)` if it was already gone
fn absent_ok(result: io::Result<()>) -> io::Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
