// src/remote/mod.rs

//! Remote subscription source
//!
//! This module provides functionality for:
//! - Verifying an OAuth2 token and reading the user's profile
//! - Fetching the full, paginated list of subscribed mods
//! - Saving that list as the subscription snapshot

use crate::error::{Error, Result};
use crate::snapshot::SnapshotStore;
use crate::snapshot::models::{ModId, SubscriptionRecord};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// mod.io API endpoint for BONELAB
pub const MODIO_API: &str = "https://g-3809.modapi.io/v1";

/// mod.io game id of BONELAB
pub const BONELAB_GAME_ID: u32 = 3809;

/// Page size requested from the API (its maximum)
const PAGE_SIZE: u64 = 100;

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts for a request that fails in transport
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Anything that can produce the user's complete subscription list
pub trait SubscriptionSource {
    fn fetch_subscriptions(&self) -> Result<Vec<SubscriptionRecord>>;
}

/// Authenticated user, as returned by `/me`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub profile_url: String,
}

/// One page of `/me/subscribed`
#[derive(Debug, Deserialize)]
pub struct SubscribedPage {
    pub data: Vec<SubscribedMod>,
    pub result_total: u64,
}

/// The two fields of a subscribed mod that matter here
#[derive(Debug, Deserialize)]
pub struct SubscribedMod {
    pub id: ModId,
    #[serde(default)]
    pub name: String,
}

/// HTTP client for the mod.io API with retry support
pub struct ModIoClient {
    client: Client,
    base_url: String,
    game_id: u32,
    token: String,
    max_retries: u32,
}

impl ModIoClient {
    /// Create a client for BONELAB on the public API
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(MODIO_API, BONELAB_GAME_ID, token)
    }

    /// Create a client against an arbitrary API root
    pub fn with_base_url(
        base_url: impl Into<String>,
        game_id: u32,
        token: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            game_id,
            token: token.into(),
            max_retries: MAX_RETRIES,
        })
    }

    /// Fetch the profile of the token's owner
    pub fn fetch_profile(&self) -> Result<UserProfile> {
        let profile: UserProfile = self.get_json(&format!("{}/me", self.base_url))?;
        info!("Authenticated as {}", profile.username);
        Ok(profile)
    }

    fn page_url(&self, offset: u64) -> String {
        format!(
            "{}/me/subscribed?game_id={}&_limit={}&_offset={}",
            self.base_url, self.game_id, PAGE_SIZE, offset
        )
    }

    /// GET `url` and decode its JSON body, retrying transport failures
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).bearer_auth(&self.token).send() {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        return Err(Error::RemoteError(format!("HTTP {} from {}", status, url)));
                    }

                    return response.json().map_err(|e| {
                        Error::RemoteError(format!("Failed to parse response from {}: {}", url, e))
                    });
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::RemoteError(format!(
                            "Request to {} failed after {} attempts: {}",
                            url, attempt, e
                        )));
                    }
                    warn!("Request attempt {} failed: {}, retrying...", attempt, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }
}

impl SubscriptionSource for ModIoClient {
    fn fetch_subscriptions(&self) -> Result<Vec<SubscriptionRecord>> {
        collect_pages(|offset| {
            debug!("Fetching subscriptions at offset {}", offset);
            self.get_json(&self.page_url(offset))
        })
    }
}

/// Pull pages until `result_total` records are collected or a page is empty
pub fn collect_pages<F>(mut fetch: F) -> Result<Vec<SubscriptionRecord>>
where
    F: FnMut(u64) -> Result<SubscribedPage>,
{
    let mut records = Vec::new();
    let mut offset = 0u64;
    let mut page_number = 1;

    loop {
        let page = fetch(offset)?;
        let received = page.data.len() as u64;
        info!(
            "Loaded page {} ({} of {} subscriptions)",
            page_number,
            offset + received,
            page.result_total
        );

        records.extend(
            page.data
                .into_iter()
                .map(|m| SubscriptionRecord::new(m.id, m.name)),
        );

        if received == 0 || records.len() as u64 >= page.result_total {
            break;
        }
        offset += received;
        page_number += 1;
    }

    Ok(records)
}

/// Fetch the subscription list from `source` and replace the snapshot
pub fn refresh_subscriptions(
    source: &dyn SubscriptionSource,
    store: &SnapshotStore,
) -> Result<Vec<SubscriptionRecord>> {
    let records = source.fetch_subscriptions()?;
    if records.is_empty() {
        warn!("Subscription source returned no subscriptions");
    }
    store.save_subscriptions(&records)?;
    Ok(records)
}
