// src/sweep/mod.rs

//! Reconciliation and safe deletion
//!
//! A sweep runs in two steps so that the caller can ask the user in between:
//!
//! 1. [`Sweeper::plan`] loads both snapshots, reconciles them, sizes the
//!    candidates and writes the audit record. Nothing is deleted.
//! 2. [`Sweeper::execute`] takes the plan and the user's answer. Only a
//!    confirmed plan deletes anything, and only then is the installed
//!    snapshot rewritten.

pub mod audit;
pub mod commit;
pub mod executor;
pub mod impact;
pub mod layout;
pub mod reconcile;

use crate::error::{Error, Result};
use crate::session::Session;
use crate::snapshot::models::InstalledItem;
use executor::{DeletionOutcome, Execution, FsRemover, Remover};
use impact::ImpactEstimate;
use layout::ModLayout;
use reconcile::Risk;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Everything known about a sweep before anything is deleted
#[derive(Debug, Clone)]
pub struct SweepPlan {
    /// Installed snapshot as loaded at the start of the run
    pub installed: Vec<InstalledItem>,
    /// Number of distinct subscribed identifiers
    pub subscribed: usize,
    /// Installed items that are no longer subscribed, in snapshot order
    pub candidates: Vec<InstalledItem>,
    pub risk: Risk,
    pub impact: ImpactEstimate,
    /// Keys shared between a candidate and a subscribed item; never deleted
    pub contested_keys: BTreeSet<String>,
    /// Where the audit record was written, if there were candidates
    pub audit_path: Option<PathBuf>,
    /// The session's mods root is not a directory, so every artifact looks
    /// absent and deleting would only drop entries from the snapshot
    pub mods_root_missing: bool,
}

impl SweepPlan {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Result of a confirmed sweep
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub outcomes: Vec<DeletionOutcome>,
    /// Installed snapshot as written at the end of the run
    pub retained: Vec<InstalledItem>,
}

impl SweepReport {
    pub fn removed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}

/// How a sweep ended
#[derive(Debug, Clone)]
pub enum SweepResult {
    /// No candidates; nothing was written
    NothingToDo,
    /// The user did not confirm; only the audit record was written
    Declined,
    Completed(SweepReport),
}

/// Runs sweeps for one session
pub struct Sweeper<'a, R: Remover = FsRemover> {
    session: &'a Session,
    remover: R,
}

impl<'a> Sweeper<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self::with_remover(session, FsRemover)
    }
}

impl<'a, R: Remover> Sweeper<'a, R> {
    pub fn with_remover(session: &'a Session, remover: R) -> Self {
        Self { session, remover }
    }

    fn layout(&self) -> ModLayout {
        ModLayout::new(self.session.mods_root())
    }

    /// Reconcile the snapshots and write the audit record
    ///
    /// Fails without side effects if either snapshot is missing.
    pub fn plan(&self) -> Result<SweepPlan> {
        let store = self.session.snapshots();

        for path in [store.subscriptions_path(), store.installed_path()] {
            if !path.exists() {
                return Err(Error::SnapshotNotFound(path.display().to_string()));
            }
        }

        let subscribed = store.load_subscription_set()?;
        let installed = store.load_installed()?;

        let candidates = reconcile::reconcile(&subscribed, &installed);
        let risk = Risk::assess(&subscribed, installed.len(), candidates.len());

        let mut plan = SweepPlan {
            subscribed: subscribed.len(),
            risk,
            impact: ImpactEstimate::default(),
            contested_keys: BTreeSet::new(),
            audit_path: None,
            mods_root_missing: false,
            installed,
            candidates,
        };

        if plan.is_empty() {
            debug!("No unsubscribed mods found");
            return Ok(plan);
        }

        if risk.is_high() {
            debug!("High-risk sweep: {}", risk);
        }

        let mods_root = self.session.mods_root();
        if !mods_root.is_dir() {
            warn!("Mods directory {} does not exist or is not a directory", mods_root.display());
            plan.mods_root_missing = true;
        }

        let audit_path = self.session.audit_path();
        audit::write_audit(&audit_path, &plan.candidates)?;
        plan.audit_path = Some(audit_path);

        plan.contested_keys = reconcile::contested_keys(&subscribed, &plan.installed);
        for key in &plan.contested_keys {
            debug!("On-disk key '{}' is used by both a subscribed and an unsubscribed mod", key);
        }

        plan.impact = impact::estimate(&self.layout(), &plan.candidates);

        debug!(
            "Found {} unsubscribed mod(s) occupying {}",
            plan.candidates.len(),
            impact::format_size(plan.impact.total_bytes)
        );
        Ok(plan)
    }

    /// Delete the plan's candidates if `confirmed`, then commit the survivors
    pub fn execute(&self, plan: &SweepPlan, confirmed: bool) -> Result<SweepResult> {
        if plan.is_empty() {
            return Ok(SweepResult::NothingToDo);
        }

        let outcomes = match executor::execute(
            &self.layout(),
            &plan.candidates,
            &plan.contested_keys,
            confirmed,
            &self.remover,
        ) {
            Execution::Declined => return Ok(SweepResult::Declined),
            Execution::Completed(outcomes) => outcomes,
        };

        let retained = commit::commit(&self.session.snapshots(), &plan.installed, &outcomes)?;
        Ok(SweepResult::Completed(SweepReport { outcomes, retained }))
    }
}
