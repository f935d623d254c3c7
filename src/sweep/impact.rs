// src/sweep/impact.rs

//! Disk impact estimation for deletion candidates
//!
//! Sizing is advisory. A folder or descriptor that cannot be measured counts
//! as zero bytes and produces a [`SizeWarning`]; it never fails the sweep.

use super::layout::ModLayout;
use crate::snapshot::models::InstalledItem;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A component that could not be sized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeWarning {
    pub path: PathBuf,
    pub detail: String,
}

impl fmt::Display for SizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.detail)
    }
}

/// Footprint of a single candidate
#[derive(Debug, Clone)]
pub struct ItemImpact {
    pub item: InstalledItem,
    pub bytes: u64,
    pub warnings: Vec<SizeWarning>,
}

/// Footprint of all candidates
#[derive(Debug, Clone, Default)]
pub struct ImpactEstimate {
    pub items: Vec<ItemImpact>,
    pub total_bytes: u64,
}

impl ImpactEstimate {
    pub fn warnings(&self) -> impl Iterator<Item = &SizeWarning> {
        self.items.iter().flat_map(|i| i.warnings.iter())
    }
}

/// Total size of all regular files under `path`; zero if it does not exist
pub fn directory_size(path: &Path) -> Result<u64, SizeWarning> {
    match path.symlink_metadata() {
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(warning(path, e.to_string())),
        Ok(_) => {}
    }

    let mut total = 0u64;
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(path).to_path_buf();
            warning(&at, e.to_string())
        })?;

        if entry.file_type().is_file() {
            let metadata = entry
                .metadata()
                .map_err(|e| warning(entry.path(), e.to_string()))?;
            total += metadata.len();
        }
    }

    Ok(total)
}

/// Size of a single file; zero if it does not exist
pub fn file_size(path: &Path) -> Result<u64, SizeWarning> {
    match path.metadata() {
        Ok(metadata) => Ok(metadata.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(warning(path, e.to_string())),
    }
}

fn warning(path: &Path, detail: String) -> SizeWarning {
    SizeWarning {
        path: path.to_path_buf(),
        detail,
    }
}

/// Size one candidate's folder and descriptor
pub fn estimate_item(layout: &ModLayout, item: &InstalledItem) -> ItemImpact {
    let mut impact = ItemImpact {
        item: item.clone(),
        bytes: 0,
        warnings: Vec::new(),
    };

    let (folder, descriptor) = match layout.artifacts(&item.on_disk_key) {
        Ok(paths) => paths,
        Err(detail) => {
            impact.warnings.push(warning(layout.root(), detail));
            return impact;
        }
    };

    for size in [directory_size(&folder), file_size(&descriptor)] {
        match size {
            Ok(bytes) => impact.bytes += bytes,
            Err(w) => impact.warnings.push(w),
        }
    }

    impact
}

/// Size every candidate and sum the results
pub fn estimate(layout: &ModLayout, candidates: &[InstalledItem]) -> ImpactEstimate {
    let mut estimate = ImpactEstimate::default();

    for item in candidates {
        let impact = estimate_item(layout, item);
        for w in &impact.warnings {
            debug!("Could not size mod {} ({}): {}", item.identifier, item.on_disk_key, w);
        }
        debug!("Mod {} occupies {} bytes", item.identifier, impact.bytes);
        estimate.total_bytes += impact.bytes;
        estimate.items.push(impact);
    }

    estimate
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let b = bytes as f64;
    if b >= GIB {
        format!("{:.1} GB", b / GIB)
    } else if b >= MIB {
        format!("{:.1} MB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}
