// src/session.rs

//! User session for modsweep
//!
//! The session is loaded once at process start from `user.json` in the data
//! directory and then passed by reference to every operation. Nothing in the
//! library reads it from global state.

use crate::error::{Error, Result};
use crate::snapshot::{self, SnapshotStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the session file
pub const SESSION_FILE: &str = "user.json";

/// File name of the pre-deletion audit record
pub const AUDIT_FILE: &str = "modsToDelete.txt";

/// Contents of `user.json`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Root directory containing one folder and one `.manifest` per mod
    #[serde(rename = "modsPath")]
    pub mods_path: PathBuf,

    /// OAuth2 bearer token for the subscription API
    #[serde(rename = "OAuth2")]
    pub token: String,

    pub username: String,

    #[serde(rename = "profileURL")]
    pub profile_url: String,
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("mods_path", &self.mods_path)
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .field("profile_url", &self.profile_url)
            .finish()
    }
}

/// A loaded session: the user's configuration plus where its files live
#[derive(Debug, Clone)]
pub struct Session {
    data_dir: PathBuf,
    user: UserConfig,
}

impl Session {
    pub fn new(data_dir: impl Into<PathBuf>, user: UserConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            user,
        }
    }

    /// Path of the session file inside `data_dir`
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(SESSION_FILE)
    }

    /// Load the session from `data_dir`
    ///
    /// Fails with [`Error::SessionNotFound`] when `user.json` does not exist.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = Self::path_in(data_dir);
        let user: UserConfig = snapshot::read_json(&path).map_err(|e| match e {
            Error::SnapshotNotFound(p) => Error::SessionNotFound(p),
            other => other,
        })?;

        Ok(Self::new(data_dir, user))
    }

    /// Write the session to `user.json`
    pub fn save(&self) -> Result<()> {
        let path = Self::path_in(&self.data_dir);
        snapshot::write_json_atomic(&path, &self.user)?;
        info!("Saved session for {} to {}", self.user.username, path.display());
        Ok(())
    }

    pub fn user(&self) -> &UserConfig {
        &self.user
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn mods_root(&self) -> &Path {
        &self.user.mods_path
    }

    pub fn token(&self) -> &str {
        &self.user.token
    }

    pub fn audit_path(&self) -> PathBuf {
        self.data_dir.join(AUDIT_FILE)
    }

    pub fn snapshots(&self) -> SnapshotStore {
        SnapshotStore::new(&self.data_dir)
    }
}
