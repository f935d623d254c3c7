// tests/integration_test.rs

//! Integration tests for modsweep
//!
//! These tests run whole sweeps against a temporary data directory and a
//! temporary mods root.

use modsweep::scanner;
use modsweep::session::{AUDIT_FILE, Session, UserConfig};
use modsweep::snapshot::SnapshotStore;
use modsweep::sweep::executor::{FsRemover, Remover};
use modsweep::sweep::reconcile::Risk;
use modsweep::sweep::{SweepResult, Sweeper};
use modsweep::{Error, InstalledItem, ModId, SubscriptionRecord};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    _dir: TempDir,
    data: PathBuf,
    mods: PathBuf,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let mods = dir.path().join("Mods");
        fs::create_dir_all(&data).unwrap();
        fs::create_dir_all(&mods).unwrap();

        Session::new(
            &data,
            UserConfig {
                mods_path: mods.clone(),
                token: "token".to_string(),
                username: "player".to_string(),
                profile_url: "https://mod.io/u/player".to_string(),
            },
        )
        .save()
        .unwrap();

        Self {
            _dir: dir,
            data,
            mods,
        }
    }

    fn session(&self) -> Session {
        Session::load(&self.data).unwrap()
    }

    fn store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.data)
    }

    fn subscribe(&self, ids: &[&str]) {
        let records: Vec<_> = ids
            .iter()
            .map(|id| SubscriptionRecord::new(id.parse().unwrap(), format!("Mod {}", id)))
            .collect();
        self.store().save_subscriptions(&records).unwrap();
    }

    fn install(&self, items: &[(&str, &str)]) -> Vec<InstalledItem> {
        let items: Vec<_> = items
            .iter()
            .map(|(id, key)| InstalledItem::new(id.parse().unwrap(), *key))
            .collect();
        self.store().save_installed(&items).unwrap();
        items
    }

    fn lay_down(&self, key: &str, bytes: usize) {
        fs::create_dir_all(self.mods.join(key)).unwrap();
        fs::write(self.mods.join(key).join("bundle.bin"), vec![0u8; bytes]).unwrap();
        fs::write(self.mods.join(format!("{}.manifest", key)), b"{}").unwrap();
    }

    fn exists(&self, key: &str) -> bool {
        self.mods.join(key).exists() || self.mods.join(format!("{}.manifest", key)).exists()
    }
}

fn item(id: &str, key: &str) -> InstalledItem {
    InstalledItem::new(id.parse().unwrap(), key)
}

#[test]
fn test_confirmed_sweep_removes_unsubscribed_mods() {
    let env = Env::new();
    env.subscribe(&["1", "2"]);
    env.install(&[("1", "a"), ("2", "b"), ("3", "c")]);
    for key in ["a", "b", "c"] {
        env.lay_down(key, 100);
    }

    let session = env.session();
    let sweeper = Sweeper::new(&session);
    let plan = sweeper.plan().unwrap();

    assert_eq!(plan.candidates, vec![item("3", "c")]);
    assert_eq!(plan.impact.total_bytes, 102);
    assert_eq!(plan.risk, Risk::Normal);

    let SweepResult::Completed(report) = sweeper.execute(&plan, true).unwrap() else {
        panic!("expected completed sweep");
    };

    assert_eq!(report.removed_count(), 1);
    assert_eq!(report.failures().count(), 0);
    assert_eq!(
        env.store().load_installed().unwrap(),
        vec![item("1", "a"), item("2", "b")]
    );
    assert!(env.exists("a"));
    assert!(env.exists("b"));
    assert!(!env.exists("c"));
}

#[test]
fn test_declined_sweep_leaves_snapshot_but_writes_audit() {
    let env = Env::new();
    env.subscribe(&["1"]);
    let before = env.install(&[("1", "a"), ("2", "b"), ("3", "c")]);
    env.lay_down("b", 10);
    let snapshot_bytes = fs::read(env.store().installed_path()).unwrap();

    let session = env.session();
    let sweeper = Sweeper::new(&session);
    let plan = sweeper.plan().unwrap();
    let result = sweeper.execute(&plan, false).unwrap();

    assert!(matches!(result, SweepResult::Declined));
    assert_eq!(env.store().load_installed().unwrap(), before);
    assert_eq!(fs::read(env.store().installed_path()).unwrap(), snapshot_bytes);
    assert!(env.exists("b"));

    let audit = fs::read_to_string(env.data.join(AUDIT_FILE)).unwrap();
    assert_eq!(audit, "Mod ID: 2, Barcode: b\nMod ID: 3, Barcode: c\n");
}

#[test]
fn test_absent_artifacts_are_dropped_from_snapshot() {
    let env = Env::new();
    env.subscribe(&["1"]);
    env.install(&[("1", "a"), ("7", "never-downloaded")]);

    let session = env.session();
    let sweeper = Sweeper::new(&session);
    let plan = sweeper.plan().unwrap();
    assert_eq!(plan.impact.total_bytes, 0);

    let SweepResult::Completed(report) = sweeper.execute(&plan, true).unwrap() else {
        panic!("expected completed sweep");
    };

    assert_eq!(report.removed_count(), 1);
    assert_eq!(env.store().load_installed().unwrap(), vec![item("1", "a")]);
}

/// Refuses to remove one particular folder
struct Stubborn(PathBuf);

impl Remover for Stubborn {
    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        if path == self.0 {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied"));
        }
        FsRemover.remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        FsRemover.remove_file(path)
    }
}

#[test]
fn test_single_failure_does_not_block_the_rest() {
    let env = Env::new();
    env.subscribe(&["100"]);
    env.install(&[("100", "keep"), ("1", "x"), ("2", "y"), ("3", "z")]);
    for key in ["keep", "x", "y", "z"] {
        env.lay_down(key, 8);
    }

    let session = env.session();
    let sweeper = Sweeper::with_remover(&session, Stubborn(env.mods.join("y")));
    let plan = sweeper.plan().unwrap();
    assert_eq!(plan.candidates.len(), 3);

    let SweepResult::Completed(report) = sweeper.execute(&plan, true).unwrap() else {
        panic!("expected completed sweep");
    };

    assert_eq!(report.removed_count(), 2);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].candidate, item("2", "y"));
    assert!(failures[0].error_detail.as_deref().unwrap().contains("access denied"));

    assert_eq!(
        env.store().load_installed().unwrap(),
        vec![item("100", "keep"), item("2", "y")]
    );
    assert!(!env.exists("x"));
    assert!(env.exists("y"));
    assert!(!env.exists("z"));
}

#[test]
fn test_empty_subscriptions_are_flagged_high_risk() {
    let env = Env::new();
    env.subscribe(&[]);
    env.install(&[("1", "a")]);

    let session = env.session();
    let plan = Sweeper::new(&session).plan().unwrap();

    assert_eq!(plan.candidates, vec![item("1", "a")]);
    assert_eq!(plan.risk, Risk::NoSubscriptions);
    assert!(plan.risk.is_high());
    assert!(plan.audit_path.unwrap().exists());
}

#[test]
fn test_nothing_installed_is_nothing_to_do() {
    let env = Env::new();
    env.subscribe(&["1"]);
    env.install(&[]);

    let session = env.session();
    let sweeper = Sweeper::new(&session);
    let plan = sweeper.plan().unwrap();

    assert!(plan.is_empty());
    assert!(matches!(
        sweeper.execute(&plan, true).unwrap(),
        SweepResult::NothingToDo
    ));
}

#[test]
fn test_missing_installed_snapshot_aborts() {
    let env = Env::new();
    env.subscribe(&["1"]);
    env.lay_down("a", 4);

    let session = env.session();
    let result = Sweeper::new(&session).plan();

    assert!(matches!(result, Err(Error::SnapshotNotFound(_))));
    assert!(!env.data.join(AUDIT_FILE).exists());
    assert!(env.exists("a"));
}

#[test]
fn test_missing_session_aborts() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Session::load(dir.path()),
        Err(Error::SessionNotFound(_))
    ));
}

#[test]
fn test_mixed_id_representations_match() {
    let env = Env::new();
    fs::write(
        env.store().subscriptions_path(),
        r#"[{"name": "Numeric", "id": 501}, {"name": "Stringly", "id": "502"}]"#,
    )
    .unwrap();
    fs::write(
        env.store().installed_path(),
        r#"[
            {"barcode": "n", "modId": "501"},
            {"barcode": "s", "modId": 502},
            {"barcode": "o", "modId": 503}
        ]"#,
    )
    .unwrap();

    let session = env.session();
    let plan = Sweeper::new(&session).plan().unwrap();
    assert_eq!(plan.candidates, vec![InstalledItem::new(ModId::from(503), "o")]);
}

#[test]
fn test_rerun_after_sweep_is_a_no_op() {
    let env = Env::new();
    env.subscribe(&["1"]);
    env.install(&[("1", "a"), ("2", "b")]);
    env.lay_down("b", 1);

    let session = env.session();
    let sweeper = Sweeper::new(&session);
    let plan = sweeper.plan().unwrap();
    sweeper.execute(&plan, true).unwrap();

    let again = sweeper.plan().unwrap();
    assert!(again.is_empty());
}

#[test]
fn test_scan_then_sweep() {
    let env = Env::new();
    for (key, id) in [("Keep.Pack", 1), ("Drop.Pack", 2)] {
        env.lay_down(key, 16);
        fs::write(
            env.mods.join(format!("{}.manifest", key)),
            format!(
                r#"{{"objects": {{"2": {{"barcode": "{}"}}, "3": {{"modId": {}}}}}}}"#,
                key, id
            ),
        )
        .unwrap();
    }

    let report = scanner::scan(&env.mods).unwrap();
    assert_eq!(report.items.len(), 2);
    env.store().save_installed(&report.items).unwrap();
    env.subscribe(&["1"]);

    let session = env.session();
    let sweeper = Sweeper::new(&session);
    let plan = sweeper.plan().unwrap();
    assert_eq!(plan.candidates, vec![item("2", "Drop.Pack")]);

    sweeper.execute(&plan, true).unwrap();
    assert!(env.exists("Keep.Pack"));
    assert!(!env.exists("Drop.Pack"));
    assert_eq!(
        env.store().load_installed().unwrap(),
        vec![item("1", "Keep.Pack")]
    );
}
