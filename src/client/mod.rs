use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::{AccountCredentials, ServerConfig};
use crate::error::{excerpt, SuiteError, SuiteResult, BODY_EXCERPT_LEN};
use crate::models::mattermost::{
    AddMemberRequest, CreateChannelRequest, CreatePostRequest, LoginRequest,
};
use crate::services::session::RequestHeaders;

pub const API_PREFIX: &str = "/api/v4";

/// A fully read HTTP response. Non-2xx statuses are not errors here; callers assert on them.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_excerpt(&self) -> String {
        excerpt(&self.body, BODY_EXCERPT_LEN)
    }

    pub fn body_contains_ignore_case(&self, needle: &str) -> bool {
        self.body.to_lowercase().contains(&needle.to_lowercase())
    }

    pub fn json<T: DeserializeOwned>(&self) -> SuiteResult<T> {
        serde_json::from_str(&self.body).map_err(|e| SuiteError::Decode {
            url: self.url.clone(),
            message: format!("{} (body: {})", e, self.body_excerpt()),
        })
    }

    /// Turns any status other than `expected` into [`SuiteError::Status`].
    pub fn expect_status(self, expected: StatusCode) -> SuiteResult<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(self.into_status_error())
        }
    }

    pub fn into_status_error(self) -> SuiteError {
        let body = self.body_excerpt();
        SuiteError::Status {
            url: self.url,
            status: self.status,
            body,
        }
    }
}

/// Client for the Mattermost REST API v4.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    login_timeout: Duration,
}

impl ApiClient {
    pub fn new(server: &ServerConfig) -> SuiteResult<Self> {
        Self::with_timeouts(
            &server.base_url,
            server.request_timeout(),
            server.login_timeout(),
        )
    }

    pub fn with_timeouts(
        base_url: &str,
        request_timeout: Duration,
        login_timeout: Duration,
    ) -> SuiteResult<Self> {
        // Idle connections are bound to the runtime that opened them, and each
        // #[tokio::test] runs its own runtime.
        let client = Client::builder()
            .timeout(request_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| SuiteError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            login_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn send(&self, request: RequestBuilder, url: String) -> SuiteResult<ApiResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| SuiteError::from_reqwest(&url, e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| SuiteError::from_reqwest(&url, e))?;

        debug!("{} -> {} ({} bytes)", url, status, body.len());

        Ok(ApiResponse {
            url,
            status,
            headers,
            body,
        })
    }

    /// `POST /users/login`. Carries no auth headers and uses the login timeout.
    pub async fn login(&self, credentials: &AccountCredentials) -> SuiteResult<ApiResponse> {
        let url = self.url("/users/login");
        let payload = LoginRequest {
            login_id: &credentials.login_id,
            password: &credentials.password,
        };
        let request = self
            .client
            .post(&url)
            .timeout(self.login_timeout)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload);
        self.send(request, url).await
    }

    pub async fn create_channel(
        &self,
        headers: &RequestHeaders,
        payload: &CreateChannelRequest,
    ) -> SuiteResult<ApiResponse> {
        let url = self.url("/channels");
        let request = self
            .client
            .post(&url)
            .headers(headers.to_header_map())
            .json(payload);
        self.send(request, url).await
    }

    pub async fn delete_channel(
        &self,
        headers: &RequestHeaders,
        channel_id: &str,
    ) -> SuiteResult<ApiResponse> {
        let url = self.url(&format!("/channels/{channel_id}"));
        let request = self.client.delete(&url).headers(headers.to_header_map());
        self.send(request, url).await
    }

    pub async fn create_post(
        &self,
        headers: &RequestHeaders,
        payload: &CreatePostRequest,
    ) -> SuiteResult<ApiResponse> {
        let url = self.url("/posts");
        let request = self
            .client
            .post(&url)
            .headers(headers.to_header_map())
            .json(payload);
        self.send(request, url).await
    }

    pub async fn channel_posts(
        &self,
        headers: &RequestHeaders,
        channel_id: &str,
    ) -> SuiteResult<ApiResponse> {
        let url = self.url(&format!("/channels/{channel_id}/posts"));
        let request = self.client.get(&url).headers(headers.to_header_map());
        self.send(request, url).await
    }

    pub async fn add_channel_member(
        &self,
        headers: &RequestHeaders,
        channel_id: &str,
        user_id: &str,
    ) -> SuiteResult<ApiResponse> {
        let url = self.url(&format!("/channels/{channel_id}/members"));
        let request = self
            .client
            .post(&url)
            .headers(headers.to_header_map())
            .json(&AddMemberRequest { user_id });
        self.send(request, url).await
    }

    pub async fn remove_channel_member(
        &self,
        headers: &RequestHeaders,
        channel_id: &str,
        user_id: &str,
    ) -> SuiteResult<ApiResponse> {
        let url = self.url(&format!("/channels/{channel_id}/members/{user_id}"));
        let request = self.client.delete(&url).headers(headers.to_header_map());
        self.send(request, url).await
    }

    pub async fn channel_members(
        &self,
        headers: &RequestHeaders,
        channel_id: &str,
    ) -> SuiteResult<ApiResponse> {
        let url = self.url(&format!("/channels/{channel_id}/members"));
        let request = self.client.get(&url).headers(headers.to_header_map());
        self.send(request, url).await
    }
}
