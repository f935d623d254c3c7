// src/lib.rs

//! modsweep
//!
//! Reconciles locally installed mods against a mod.io subscription list and
//! removes the ones that are no longer subscribed to.
//!
//! # Architecture
//!
//! - Snapshots: subscriptions and installed mods live in small JSON files
//! - Sweep: reconcile, size, audit, delete, commit, strictly in that order
//! - Fault isolation: one mod failing to delete never aborts the batch
//! - Nothing is deleted without an explicit confirmation

mod error;
pub mod remote;
pub mod scanner;
pub mod session;
pub mod snapshot;
pub mod sweep;

pub use error::{Error, Result};
pub use session::Session;
pub use snapshot::models::{InstalledItem, ModId, SubscriptionRecord};
