// src/scanner.rs

//! Local installation scanner
//!
//! Walks the mods root and reads every `*.manifest` descriptor. A descriptor
//! describes a mod.io-installed mod when its `objects` table has both an
//! entry `"2"` carrying the pallet barcode and an entry `"3"` carrying the
//! mod.io `modId`. Nothing else in the manifest is interpreted.

use crate::error::{Error, Result};
use crate::snapshot::models::{InstalledItem, ModId};
use crate::sweep::layout::DESCRIPTOR_SUFFIX;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A manifest that could not be turned into an [`InstalledItem`]
#[derive(Debug, Clone)]
pub struct SkippedManifest {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of scanning a mods root
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub items: Vec<InstalledItem>,
    pub skipped: Vec<SkippedManifest>,
    /// On-disk keys claimed by more than one manifest
    pub duplicate_keys: BTreeSet<String>,
}

/// Scan `root` for installed mods
pub fn scan(root: &Path) -> Result<ScanReport> {
    if !root.is_dir() {
        return Err(Error::InitError(format!(
            "Mods directory not found: {}",
            root.display()
        )));
    }

    info!("Scanning {} for installed mods", root.display());

    let mut report = ScanReport::default();
    let mut seen_keys: BTreeMap<String, usize> = BTreeMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path during scan: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file()
            || !entry.file_name().to_string_lossy().ends_with(DESCRIPTOR_SUFFIX)
        {
            continue;
        }

        match read_manifest(entry.path()) {
            Ok(Some(item)) => {
                debug!("Found mod {} ({})", item.identifier, item.on_disk_key);
                *seen_keys.entry(item.on_disk_key.clone()).or_default() += 1;
                report.items.push(item);
            }
            Ok(None) => {}
            Err(reason) => {
                warn!("Error reading manifest {}: {}", entry.path().display(), reason);
                report.skipped.push(SkippedManifest {
                    path: entry.path().to_path_buf(),
                    reason,
                });
            }
        }
    }

    report.duplicate_keys = seen_keys
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| key)
        .collect();
    for key in &report.duplicate_keys {
        warn!("On-disk key '{}' is claimed by more than one manifest", key);
    }

    info!("Found {} installed mods", report.items.len());
    Ok(report)
}

/// Read one manifest; `Ok(None)` if it does not describe a mod.io mod
fn read_manifest(path: &Path) -> std::result::Result<Option<InstalledItem>, String> {
    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    let manifest: Value = serde_json::from_slice(&data).map_err(|e| e.to_string())?;
    parse_manifest(&manifest)
}

fn parse_manifest(manifest: &Value) -> std::result::Result<Option<InstalledItem>, String> {
    let Some(objects) = manifest.get("objects") else {
        return Ok(None);
    };
    let Some(mod_entry) = objects.get("3") else {
        return Ok(None);
    };

    let raw_id = mod_entry
        .get("modId")
        .ok_or_else(|| "objects.3 has no modId".to_string())?;
    let identifier: ModId =
        serde_json::from_value(raw_id.clone()).map_err(|e| format!("invalid modId: {}", e))?;

    let barcode = objects
        .get("2")
        .and_then(|pallet| pallet.get("barcode"))
        .and_then(Value::as_str)
        .ok_or_else(|| "objects.2 has no barcode".to_string())?;

    Ok(Some(InstalledItem::new(identifier, barcode)))
}
