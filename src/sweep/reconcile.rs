// src/sweep/reconcile.rs

//! Set reconciliation between subscriptions and installed mods

use crate::snapshot::SubscriptionSet;
use crate::snapshot::models::InstalledItem;
use std::collections::BTreeSet;
use std::fmt;

/// Installed items whose identifier is not subscribed, in input order
///
/// Identifiers were canonicalized when the snapshots were loaded, so plain
/// equality is the right comparison here.
pub fn reconcile(subscribed: &SubscriptionSet, installed: &[InstalledItem]) -> Vec<InstalledItem> {
    installed
        .iter()
        .filter(|item| !subscribed.contains(&item.identifier))
        .cloned()
        .collect()
}

/// On-disk keys held by both an unsubscribed and a subscribed item
///
/// Deleting the artifacts for such a key would also destroy files that a
/// subscribed mod still uses.
pub fn contested_keys(
    subscribed: &SubscriptionSet,
    installed: &[InstalledItem],
) -> BTreeSet<String> {
    let (kept, dropped): (Vec<&InstalledItem>, Vec<&InstalledItem>) = installed
        .iter()
        .partition(|item| subscribed.contains(&item.identifier));

    let kept_keys: BTreeSet<&str> = kept.iter().map(|item| item.on_disk_key.as_str()).collect();

    dropped
        .iter()
        .filter(|item| kept_keys.contains(item.on_disk_key.as_str()))
        .map(|item| item.on_disk_key.clone())
        .collect()
}

/// How suspicious a reconciliation result looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Risk {
    /// Some but not all installed mods are unsubscribed
    Normal,
    /// The subscription snapshot is empty
    NoSubscriptions,
    /// Every installed mod is unsubscribed even though subscriptions exist
    AllUnsubscribed,
}

impl Risk {
    pub fn assess(subscribed: &SubscriptionSet, installed: usize, candidates: usize) -> Self {
        if installed == 0 || candidates == 0 {
            Risk::Normal
        } else if subscribed.is_empty() {
            Risk::NoSubscriptions
        } else if candidates == installed {
            Risk::AllUnsubscribed
        } else {
            Risk::Normal
        }
    }

    pub fn is_high(&self) -> bool {
        !matches!(self, Risk::Normal)
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Risk::Normal => write!(f, "normal"),
            Risk::NoSubscriptions => write!(
                f,
                "the subscription list is empty, so EVERY installed mod would be deleted; \
                 this usually means fetching subscriptions failed"
            ),
            Risk::AllUnsubscribed => write!(
                f,
                "none of the installed mods match a subscription, so EVERY installed mod \
                 would be deleted; check that both lists are current"
            ),
        }
    }
}
