use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::SuiteConfig;
use crate::error::SuiteResult;
use crate::services::channels::ChannelProvisioner;
use crate::services::membership::MembershipReconciler;
use crate::services::session::{RequestHeaders, Session};

/// Everything a scenario needs: immutable config, the HTTP client and the shared login.
#[derive(Clone)]
pub struct SuiteContext {
    pub config: Arc<SuiteConfig>,
    pub client: ApiClient,
    pub session: Arc<Session>,
}

impl SuiteContext {
    pub fn new(config: SuiteConfig) -> SuiteResult<Self> {
        let client = ApiClient::new(&config.server)?;
        let session = Arc::new(Session::new(config.primary.clone()));
        Ok(Self {
            config: Arc::new(config),
            client,
            session,
        })
    }

    /// Fresh headers for one test, logging in first if nobody has yet.
    pub async fn headers(&self) -> SuiteResult<RequestHeaders> {
        self.session.headers(&self.client).await
    }

    pub fn channels<'a>(&'a self, headers: &'a RequestHeaders) -> ChannelProvisioner<'a> {
        ChannelProvisioner::new(&self.client, headers, self.config.team_id())
    }

    pub fn membership<'a>(&'a self, headers: &'a RequestHeaders) -> MembershipReconciler<'a> {
        MembershipReconciler::new(&self.client, headers, self.config.timing.settle_delay())
    }
}
