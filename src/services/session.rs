use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::client::ApiClient;
use crate::config::AccountCredentials;
use crate::error::{excerpt, SuiteError, SuiteResult, LOGIN_BODY_EXCERPT_LEN};

/// Response header carrying the session token on a successful login.
pub const TOKEN_HEADER: &str = "Token";

/// Opaque session token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(<{} chars>)", self.0.len())
    }
}

/// The two headers every authenticated call sends.
#[derive(Clone, Debug)]
pub struct RequestHeaders {
    map: HeaderMap,
}

impl RequestHeaders {
    pub fn from_token(token: &AuthToken) -> SuiteResult<Self> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|e| SuiteError::InvalidHeader(format!("Authorization: {e}")))?;

        let mut map = HeaderMap::with_capacity(2);
        map.insert(AUTHORIZATION, bearer);
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self { map })
    }

    pub fn to_header_map(&self) -> HeaderMap {
        self.map.clone()
    }

    pub fn authorization(&self) -> Option<&str> {
        self.map.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Logs in once and hands out the cached token for the rest of the run.
///
/// The outcome of the single login is cached either way: after a failure every
/// later caller gets the same error and no new request is made. The token is
/// never refreshed, even after a later 401.
pub struct Session {
    credentials: AccountCredentials,
    token: OnceCell<Result<AuthToken, Arc<SuiteError>>>,
}

impl Session {
    pub fn new(credentials: AccountCredentials) -> Self {
        Self {
            credentials,
            token: OnceCell::new(),
        }
    }

    /// Concurrent first callers share a single login request.
    pub async fn token(&self, client: &ApiClient) -> SuiteResult<&AuthToken> {
        self.token
            .get_or_init(|| async {
                authenticate(client, &self.credentials).await.map_err(Arc::new)
            })
            .await
            .as_ref()
            .map_err(|e| SuiteError::Session(Arc::clone(e)))
    }

    pub fn cached_token(&self) -> Option<&AuthToken> {
        self.token.get().and_then(|outcome| outcome.as_ref().ok())
    }

    pub async fn headers(&self, client: &ApiClient) -> SuiteResult<RequestHeaders> {
        let token = self.token(client).await?;
        RequestHeaders::from_token(token)
    }
}

pub async fn authenticate(
    client: &ApiClient,
    credentials: &AccountCredentials,
) -> SuiteResult<AuthToken> {
    info!(
        "Attempting login for user {} at {}",
        credentials.login_id,
        client.base_url()
    );

    let response = client.login(credentials).await.map_err(|e| {
        error!("Login request failed: {e}");
        e
    })?;

    if !response.is_success() {
        error!("Login rejected with HTTP {}", response.status);
        let body = excerpt(&response.body, LOGIN_BODY_EXCERPT_LEN);
        return Err(SuiteError::Status {
            url: response.url,
            status: response.status,
            body,
        });
    }

    let Some(token) = response
        .header(TOKEN_HEADER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        error!("Login returned HTTP {} without a token", response.status);
        return Err(SuiteError::MissingToken {
            status: response.status,
            body: excerpt(&response.body, LOGIN_BODY_EXCERPT_LEN),
        });
    };

    info!("Authenticated successfully, token received");
    Ok(AuthToken::new(token))
}
