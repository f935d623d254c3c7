// src/snapshot/models.rs

//! Data models for subscription and installed-mod snapshots
//!
//! Identifiers are canonicalized here, at the ingestion boundary. Both
//! snapshots deserialize through [`ModId`], so a numeric `123` in one file
//! and a string `"123"` in the other compare equal everywhere downstream.

use crate::error::{Error, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical mod identifier
///
/// Canonical form: surrounding whitespace removed, and purely numeric
/// identifiers written without leading zeros.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModId(String);

impl ModId {
    /// Canonicalize a raw identifier
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidIdentifier(format!("{:?}", raw)));
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let digits = trimmed.trim_start_matches('0');
            let digits = if digits.is_empty() { "0" } else { digits };
            return Ok(Self(digits.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for ModId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for ModId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Numeric identifiers serialize as JSON numbers, the shape used by the
// subscription API and the game's manifests.
impl Serialize for ModId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_number() {
            Some(n) => serializer.serialize_u64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

struct ModIdVisitor;

impl Visitor<'_> for ModIdVisitor {
    type Value = ModId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mod identifier as a string or integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ModId, E> {
        Ok(ModId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ModId, E> {
        u64::try_from(v)
            .map(ModId::from)
            .map_err(|_| E::custom(format!("negative mod identifier: {}", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<ModId, E> {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
            Ok(ModId::from(v as u64))
        } else {
            Err(E::custom(format!("non-integral mod identifier: {}", v)))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ModId, E> {
        ModId::new(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for ModId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ModIdVisitor)
    }
}

/// One remotely subscribed mod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    #[serde(rename = "name", default)]
    pub display_name: String,

    #[serde(rename = "id")]
    pub identifier: ModId,
}

impl SubscriptionRecord {
    pub fn new(identifier: ModId, display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            identifier,
        }
    }
}

/// One mod detected on disk
///
/// `on_disk_key` is the mod's barcode: it names both the mod folder and the
/// sibling `<key>.manifest` descriptor under the mods root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstalledItem {
    #[serde(rename = "barcode")]
    pub on_disk_key: String,

    #[serde(rename = "modId")]
    pub identifier: ModId,
}

impl InstalledItem {
    pub fn new(identifier: ModId, on_disk_key: impl Into<String>) -> Self {
        Self {
            on_disk_key: on_disk_key.into(),
            identifier,
        }
    }
}
