use reqwest::StatusCode;
use std::sync::Arc;

/// Length of response-body excerpts quoted in errors and logs.
pub const BODY_EXCERPT_LEN: usize = 200;
/// Login failures quote more of the body; the server explains lockouts there.
pub const LOGIN_BODY_EXCERPT_LEN: usize = 500;

pub type SuiteResult<T> = Result<T, SuiteError>;

#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Connection to {url} failed: {message}")]
    Connection { url: String, message: String },
    #[error("Request to {url} timed out: {message}")]
    Timeout { url: String, message: String },
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("Login succeeded with HTTP {status} but no Token header was returned: {body}")]
    MissingToken { status: StatusCode, body: String },
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("Session authentication failed: {0}")]
    Session(#[source] Arc<SuiteError>),
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
    #[error("Fixture setup failed: {0}")]
    Fixture(String),
    #[error("Membership precondition failed: {0}")]
    Membership(String),
}

impl SuiteError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else if err.is_connect() {
            Self::Connection {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// True for failures where no HTTP response was received at all.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Session(inner) => inner.is_transport(),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } | Self::MissingToken { status, .. } => Some(*status),
            Self::Session(inner) => inner.status(),
            _ => None,
        }
    }
}

/// Truncates `body` to at most `max_chars` characters, on a char boundary.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
