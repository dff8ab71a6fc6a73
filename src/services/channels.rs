use futures::FutureExt;
use reqwest::StatusCode;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::{SuiteError, SuiteResult};
use crate::models::mattermost::{Channel, CreateChannelRequest};
use crate::services::session::RequestHeaders;

pub const CHANNEL_NAME_PREFIX: &str = "test-auto";
pub const DISPLAY_NAME_PREFIX: &str = "Temporary test channel";

/// Eight lowercase hex characters from a fresh v4 UUID.
pub fn unique_suffix() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(8);
    hex
}

pub fn unique_channel_name(prefix: &str) -> String {
    format!("{}-{}", prefix, unique_suffix())
}

/// Result of a best-effort channel deletion. Never escalated into a test failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Deleted,
    AlreadyGone,
    Failed { status: StatusCode, body: String },
    Unreachable(String),
}

impl CleanupOutcome {
    /// True when the channel is known not to exist any more.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Deleted | Self::AlreadyGone)
    }
}

/// Deletes `channel_id`, logging instead of failing when that does not work.
pub async fn cleanup_channel(
    client: &ApiClient,
    headers: &RequestHeaders,
    channel_id: &str,
) -> CleanupOutcome {
    info!("Deleting test channel {}", channel_id);

    let response = match client.delete_channel(headers, channel_id).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Error while deleting test channel {}: {}", channel_id, e);
            return CleanupOutcome::Unreachable(e.to_string());
        }
    };

    match response.status {
        StatusCode::OK => {
            info!("Test channel {} deleted", channel_id);
            CleanupOutcome::Deleted
        }
        StatusCode::NOT_FOUND => {
            info!("Test channel {} was already deleted or not found", channel_id);
            CleanupOutcome::AlreadyGone
        }
        status => {
            let body = response.body_excerpt();
            warn!(
                "Could not delete test channel {}. Status: {}, Response: {}",
                channel_id, status, body
            );
            CleanupOutcome::Failed { status, body }
        }
    }
}

/// Creates uniquely named public channels in one team and guarantees their removal.
#[derive(Clone, Copy)]
pub struct ChannelProvisioner<'a> {
    client: &'a ApiClient,
    headers: &'a RequestHeaders,
    team_id: &'a str,
}

impl<'a> ChannelProvisioner<'a> {
    pub fn new(client: &'a ApiClient, headers: &'a RequestHeaders, team_id: &'a str) -> Self {
        Self {
            client,
            headers,
            team_id,
        }
    }

    /// Creates a `test-auto-<hex>` channel. Any failure is a fixture error.
    pub async fn provision(&self) -> SuiteResult<Channel> {
        let name = unique_channel_name(CHANNEL_NAME_PREFIX);
        let payload = CreateChannelRequest::public(self.team_id, &name, DISPLAY_NAME_PREFIX);

        info!("Creating test channel {}", name);
        let response = self
            .client
            .create_channel(self.headers, &payload)
            .await
            .map_err(|e| SuiteError::Fixture(format!("could not create test channel {name}: {e}")))?;

        if response.status != StatusCode::CREATED {
            return Err(SuiteError::Fixture(format!(
                "could not create test channel {}: HTTP {}: {}",
                name,
                response.status,
                response.body_excerpt()
            )));
        }

        let channel: Channel = response
            .json()
            .map_err(|e| SuiteError::Fixture(format!("created channel {name} is unreadable: {e}")))?;

        info!("Test channel created: id={}, name={}", channel.id, channel.name);
        Ok(channel)
    }

    pub async fn cleanup(&self, channel_id: &str) -> CleanupOutcome {
        cleanup_channel(self.client, self.headers, channel_id).await
    }

    /// Runs `body` with a fresh channel and deletes it afterwards.
    ///
    /// The delete is attempted exactly once whether `body` returns normally,
    /// returns an error value, or panics; a panic is resumed after cleanup.
    /// If creation fails, `body` never runs and nothing is deleted.
    pub async fn scope<F, Fut, T>(&self, body: F) -> SuiteResult<T>
    where
        F: FnOnce(Channel) -> Fut,
        Fut: Future<Output = T>,
    {
        let channel = self.provision().await?;
        let channel_id = channel.id.clone();

        let result = AssertUnwindSafe(body(channel)).catch_unwind().await;

        let outcome = self.cleanup(&channel_id).await;
        if !outcome.is_clean() {
            warn!("Test channel {} may have leaked: {:?}", channel_id, outcome);
        }

        match result {
            Ok(value) => Ok(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}
