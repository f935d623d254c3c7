// src/sweep/audit.rs

//! Pre-deletion audit record
//!
//! The record is written before the user is asked to confirm, so it exists
//! for review even when the sweep is declined.

use crate::error::Result;
use crate::snapshot;
use crate::snapshot::models::InstalledItem;
use std::path::Path;
use tracing::info;

/// One line per candidate: `Mod ID: <identifier>, Barcode: <key>`
pub fn render(candidates: &[InstalledItem]) -> String {
    candidates
        .iter()
        .map(|item| format!("Mod ID: {}, Barcode: {}\n", item.identifier, item.on_disk_key))
        .collect()
}

/// Write the audit record, replacing any record from an earlier run
pub fn write_audit(path: &Path, candidates: &[InstalledItem]) -> Result<()> {
    snapshot::write_atomic(path, render(candidates).as_bytes())?;
    info!(
        "Wrote audit record for {} candidate(s) to {}",
        candidates.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::models::ModId;
    use tempfile::TempDir;

    #[test]
    fn test_render_format() {
        let candidates = vec![
            InstalledItem::new(ModId::from(3), "c"),
            InstalledItem::new(ModId::new("x-9").unwrap(), "Author.Pack"),
        ];
        assert_eq!(
            render(&candidates),
            "Mod ID: 3, Barcode: c\nMod ID: x-9, Barcode: Author.Pack\n"
        );
    }

    #[test]
    fn test_write_overwrites_previous_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modsToDelete.txt");

        write_audit(
            &path,
            &[
                InstalledItem::new(ModId::from(1), "a"),
                InstalledItem::new(ModId::from(2), "b"),
            ],
        )
        .unwrap();
        write_audit(&path, &[InstalledItem::new(ModId::from(3), "c")]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Mod ID: 3, Barcode: c\n");
    }
}
