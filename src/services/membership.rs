use reqwest::StatusCode;
use std::time::Duration;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::{SuiteError, SuiteResult};
use crate::models::mattermost::{contains_member, ChannelMember};
use crate::services::session::RequestHeaders;

const ALREADY_MEMBER_MARKER: &str = "already a member";
/// Permission id in a 403 that may also mean "never a member".
const MANAGE_MEMBERS_MARKER: &str = "manage_channel_members";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsentOutcome {
    Removed,
    NotMember,
    /// 403 naming `manage_channel_members`: either the user was never a member
    /// or we lack permission. Not distinguishable here. Other 403s are `Unconfirmed`.
    PermissionDenied { body: String },
    Unconfirmed { status: StatusCode, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentOutcome {
    Added,
    AlreadyMember,
    /// The add call failed but the member list shows the user.
    ConfirmedPresent { add_status: StatusCode },
}

/// Drives a (channel, user) membership to a desired state before a test runs.
pub struct MembershipReconciler<'a> {
    client: &'a ApiClient,
    headers: &'a RequestHeaders,
    settle_delay: Duration,
}

impl<'a> MembershipReconciler<'a> {
    pub fn new(client: &'a ApiClient, headers: &'a RequestHeaders, settle_delay: Duration) -> Self {
        Self {
            client,
            headers,
            settle_delay,
        }
    }

    /// Removes the user if present. Only a transport failure is an error.
    pub async fn ensure_absent(&self, channel_id: &str, user_id: &str) -> SuiteResult<AbsentOutcome> {
        info!("Ensuring user {} is not in channel {}", user_id, channel_id);
        let response = self
            .client
            .remove_channel_member(self.headers, channel_id, user_id)
            .await?;

        let outcome = match response.status {
            StatusCode::OK => {
                info!("User {} removed from channel {}", user_id, channel_id);
                AbsentOutcome::Removed
            }
            StatusCode::NOT_FOUND => {
                info!("User {} was not in channel {}", user_id, channel_id);
                AbsentOutcome::NotMember
            }
            StatusCode::FORBIDDEN if response.body_contains_ignore_case(MANAGE_MEMBERS_MARKER) => {
                warn!(
                    "Removing user {} from channel {} was forbidden; treating as not a member",
                    user_id, channel_id
                );
                AbsentOutcome::PermissionDenied {
                    body: response.body_excerpt(),
                }
            }
            status => {
                warn!(
                    "Could not confirm user {} is absent from channel {}. Status: {}",
                    user_id, channel_id, status
                );
                AbsentOutcome::Unconfirmed {
                    status,
                    body: response.body_excerpt(),
                }
            }
        };

        self.settle().await;
        Ok(outcome)
    }

    /// Adds the user if missing, falling back to the member list when the add is refused.
    pub async fn ensure_present(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> SuiteResult<PresentOutcome> {
        info!("Ensuring user {} is in channel {}", user_id, channel_id);
        let response = self
            .client
            .add_channel_member(self.headers, channel_id, user_id)
            .await?;

        let outcome = if response.status == StatusCode::CREATED {
            info!("User {} added to channel {}", user_id, channel_id);
            PresentOutcome::Added
        } else if response.status == StatusCode::BAD_REQUEST
            && response.body_contains_ignore_case(ALREADY_MEMBER_MARKER)
        {
            info!("User {} was already in channel {}", user_id, channel_id);
            PresentOutcome::AlreadyMember
        } else if self.is_listed(channel_id, user_id).await? {
            info!(
                "User {} confirmed in channel {} via member list after HTTP {}",
                user_id, channel_id, response.status
            );
            PresentOutcome::ConfirmedPresent {
                add_status: response.status,
            }
        } else if response.status == StatusCode::FORBIDDEN {
            return Err(SuiteError::Membership(format!(
                "permission denied adding user {} to channel {}; check the primary user's rights: {}",
                user_id,
                channel_id,
                response.body_excerpt()
            )));
        } else {
            return Err(SuiteError::Membership(format!(
                "could not add user {} to channel {}. Status: {}, Response: {}",
                user_id,
                channel_id,
                response.status,
                response.body_excerpt()
            )));
        };

        self.settle().await;
        Ok(outcome)
    }

    async fn is_listed(&self, channel_id: &str, user_id: &str) -> SuiteResult<bool> {
        let response = self.client.channel_members(self.headers, channel_id).await?;
        if response.status != StatusCode::OK {
            warn!(
                "Member list for channel {} unavailable: HTTP {}",
                channel_id, response.status
            );
            return Ok(false);
        }
        let members: Vec<ChannelMember> = response.json()?;
        Ok(contains_member(&members, user_id))
    }

    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}
