// src/snapshot/mod.rs

//! Snapshot storage for modsweep
//!
//! Two point-in-time lists live in the data directory:
//! - `subscriptions.json`: every mod the user is subscribed to (read-only input
//!   for a sweep)
//! - `installedMods.json`: every mod detected on disk, rewritten wholesale at
//!   the end of a sweep
//!
//! Every write goes through a temp file in the same directory followed by a
//! rename, so readers only ever see a complete snapshot.

pub mod models;

use crate::error::{Error, Result};
use models::{InstalledItem, ModId, SubscriptionRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// File name of the subscription snapshot
pub const SUBSCRIPTIONS_FILE: &str = "subscriptions.json";

/// File name of the installed-mods snapshot
pub const INSTALLED_FILE: &str = "installedMods.json";

/// Set of subscribed identifiers used for membership tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSet {
    ids: HashSet<ModId>,
}

impl SubscriptionSet {
    pub fn from_records(records: &[SubscriptionRecord]) -> Self {
        let set: Self = records.iter().map(|r| r.identifier.clone()).collect();
        if set.len() != records.len() {
            warn!(
                "Subscription snapshot lists {} duplicate identifier(s)",
                records.len() - set.len()
            );
        }
        set
    }

    pub fn contains(&self, id: &ModId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<ModId> for SubscriptionSet {
    fn from_iter<I: IntoIterator<Item = ModId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Both snapshots in one data directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn subscriptions_path(&self) -> PathBuf {
        self.dir.join(SUBSCRIPTIONS_FILE)
    }

    pub fn installed_path(&self) -> PathBuf {
        self.dir.join(INSTALLED_FILE)
    }

    pub fn has_subscriptions(&self) -> bool {
        self.subscriptions_path().exists()
    }

    pub fn has_installed(&self) -> bool {
        self.installed_path().exists()
    }

    /// Load the subscription snapshot
    pub fn load_subscriptions(&self) -> Result<Vec<SubscriptionRecord>> {
        let records: Vec<SubscriptionRecord> = read_json(&self.subscriptions_path())?;
        debug!("Loaded {} subscription records", records.len());
        Ok(records)
    }

    /// Load the subscription snapshot as a membership set
    pub fn load_subscription_set(&self) -> Result<SubscriptionSet> {
        Ok(SubscriptionSet::from_records(&self.load_subscriptions()?))
    }

    /// Replace the subscription snapshot
    pub fn save_subscriptions(&self, records: &[SubscriptionRecord]) -> Result<()> {
        write_json_atomic(&self.subscriptions_path(), &records)?;
        info!("Saved {} subscription records", records.len());
        Ok(())
    }

    /// Load the installed-mods snapshot
    pub fn load_installed(&self) -> Result<Vec<InstalledItem>> {
        let items: Vec<InstalledItem> = read_json(&self.installed_path())?;
        debug!("Loaded {} installed items", items.len());
        Ok(items)
    }

    /// Replace the installed-mods snapshot
    pub fn save_installed(&self, items: &[InstalledItem]) -> Result<()> {
        write_json_atomic(&self.installed_path(), &items)?;
        info!("Saved {} installed items", items.len());
        Ok(())
    }
}

/// Read a JSON file, mapping absence to [`Error::SnapshotNotFound`]
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::SnapshotNotFound(path.display().to_string()));
    }

    let data = std::fs::read(path)?;
    serde_json::from_slice(&data).map_err(|e| {
        Error::ParseError(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Serialize `value` with a 4-space indent and write it atomically
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    write_atomic(path, &buffer)
}

/// Write `contents` to a temp file next to `path`, then rename it into place
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir).map_err(|e| {
        Error::InitError(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
