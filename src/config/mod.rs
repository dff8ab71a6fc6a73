use config::{Config, ConfigError};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::time::Duration;
use validator::Validate;

pub const ENV_BASE_URL: &str = "MATTERMOST_BASE_URL";
pub const ENV_USER_LOGIN: &str = "MATTERMOST_USER_LOGIN";
pub const ENV_USER_PASSWORD: &str = "MATTERMOST_USER_PASSWORD";
pub const ENV_TEAM_ID: &str = "MATTERMOST_TEST_TEAM_ID";
pub const ENV_OTHER_USER_ID: &str = "MATTERMOST_OTHER_USER_ID";
pub const ENV_LOCKED_USER_LOGIN: &str = "MATTERMOST_LOCKED_USER_LOGIN";
pub const ENV_LOCKED_USER_PASSWORD: &str = "MATTERMOST_LOCKED_USER_PASSWORD";
pub const ENV_INACTIVE_USER_LOGIN: &str = "MATTERMOST_INACTIVE_USER_LOGIN";
pub const ENV_INACTIVE_USER_PASSWORD: &str = "MATTERMOST_INACTIVE_USER_PASSWORD";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "MATTERMOST_REQUEST_TIMEOUT_SECS";
pub const ENV_LOGIN_TIMEOUT_SECS: &str = "MATTERMOST_LOGIN_TIMEOUT_SECS";
pub const ENV_SETTLE_DELAY_MS: &str = "MATTERMOST_SETTLE_DELAY_MS";
pub const ENV_POSTS_SETTLE_DELAY_MS: &str = "MATTERMOST_POSTS_SETTLE_DELAY_MS";
pub const ENV_LOG_LEVEL: &str = "MATTERMOST_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "MATTERMOST_LOG_FORMAT";

/// Variables without which no test can run.
pub const REQUIRED_VARS: [&str; 4] = [ENV_BASE_URL, ENV_USER_LOGIN, ENV_USER_PASSWORD, ENV_TEAM_ID];

/// Every variable the loader reads.
pub const ALL_VARS: [&str; 15] = [
    ENV_BASE_URL,
    ENV_USER_LOGIN,
    ENV_USER_PASSWORD,
    ENV_TEAM_ID,
    ENV_OTHER_USER_ID,
    ENV_LOCKED_USER_LOGIN,
    ENV_LOCKED_USER_PASSWORD,
    ENV_INACTIVE_USER_LOGIN,
    ENV_INACTIVE_USER_PASSWORD,
    ENV_REQUEST_TIMEOUT_SECS,
    ENV_LOGIN_TIMEOUT_SECS,
    ENV_SETTLE_DELAY_MS,
    ENV_POSTS_SETTLE_DELAY_MS,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
];

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
const DEFAULT_POSTS_SETTLE_DELAY_MS: u64 = 2000;

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ServerConfig {
    #[validate(url)]
    pub base_url: String,
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
    #[validate(range(min = 1))]
    pub login_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }
}

#[derive(Deserialize, Clone, Validate, PartialEq, Eq)]
pub struct AccountCredentials {
    #[validate(length(min = 1))]
    pub login_id: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl AccountCredentials {
    pub fn new(login_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A test account that is only usable when both halves are configured.
#[derive(Deserialize, Clone, Default)]
pub struct OptionalAccount {
    #[serde(default)]
    pub login_id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl OptionalAccount {
    pub fn credentials(&self) -> Option<AccountCredentials> {
        match (&self.login_id, &self.password) {
            (Some(login_id), Some(password)) => {
                Some(AccountCredentials::new(login_id.clone(), password.clone()))
            }
            _ => None,
        }
    }
}

impl fmt::Debug for OptionalAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalAccount")
            .field("login_id", &self.login_id)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct TeamConfig {
    #[validate(length(min = 1))]
    pub team_id: String,
    #[serde(default)]
    pub other_user_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub settle_delay_ms: u64,
    pub posts_settle_delay_ms: u64,
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn posts_settle_delay(&self) -> Duration {
        Duration::from_millis(self.posts_settle_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct LogConfig {
    #[validate(length(min = 1))]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct SuiteConfig {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub primary: AccountCredentials,
    #[validate(nested)]
    pub team: TeamConfig,
    #[serde(default)]
    pub locked: OptionalAccount,
    #[serde(default)]
    pub inactive: OptionalAccount,
    pub timing: TimingConfig,
    #[validate(nested)]
    pub log: LogConfig,
}

/// Reads a variable, treating unset and blank values alike.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_number(name: &str) -> Result<Option<i64>, ConfigError> {
    non_empty_var(name)
        .map(|value| {
            value.trim().parse::<i64>().map_err(|e| {
                ConfigError::Message(format!(
                    "Invalid value '{}' for {}: {}. Expected a positive integer.",
                    value, name, e
                ))
            })
        })
        .transpose()
}

/// Names of the mandatory variables that are unset or blank.
pub fn missing_required_vars() -> Vec<&'static str> {
    REQUIRED_VARS
        .iter()
        .copied()
        .filter(|name| non_empty_var(name).is_none())
        .collect()
}

impl SuiteConfig {
    /// Loads `.env` (without overriding the real environment) and then reads the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let missing = missing_required_vars();
        if !missing.is_empty() {
            return Err(ConfigError::Message(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let s = Config::builder()
            .set_default("server.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .set_default("server.login_timeout_secs", DEFAULT_LOGIN_TIMEOUT_SECS)?
            .set_default("timing.settle_delay_ms", DEFAULT_SETTLE_DELAY_MS)?
            .set_default("timing.posts_settle_delay_ms", DEFAULT_POSTS_SETTLE_DELAY_MS)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            .set_override_option("server.base_url", non_empty_var(ENV_BASE_URL))?
            .set_override_option("primary.login_id", non_empty_var(ENV_USER_LOGIN))?
            .set_override_option("primary.password", non_empty_var(ENV_USER_PASSWORD))?
            .set_override_option("team.team_id", non_empty_var(ENV_TEAM_ID))?
            .set_override_option("team.other_user_id", non_empty_var(ENV_OTHER_USER_ID))?
            .set_override_option("locked.login_id", non_empty_var(ENV_LOCKED_USER_LOGIN))?
            .set_override_option("locked.password", non_empty_var(ENV_LOCKED_USER_PASSWORD))?
            .set_override_option("inactive.login_id", non_empty_var(ENV_INACTIVE_USER_LOGIN))?
            .set_override_option(
                "inactive.password",
                non_empty_var(ENV_INACTIVE_USER_PASSWORD),
            )?
            .set_override_option(
                "server.request_timeout_secs",
                parse_number(ENV_REQUEST_TIMEOUT_SECS)?,
            )?
            .set_override_option(
                "server.login_timeout_secs",
                parse_number(ENV_LOGIN_TIMEOUT_SECS)?,
            )?
            .set_override_option("timing.settle_delay_ms", parse_number(ENV_SETTLE_DELAY_MS)?)?
            .set_override_option(
                "timing.posts_settle_delay_ms",
                parse_number(ENV_POSTS_SETTLE_DELAY_MS)?,
            )?
            .set_override_option("log.level", non_empty_var(ENV_LOG_LEVEL))?
            .set_override_option("log.format", non_empty_var(ENV_LOG_FORMAT))?
            .build()?;

        let mut config: SuiteConfig = s.try_deserialize()?;

        if let Err(e) = config.validate() {
            return Err(ConfigError::Message(format!("Validation error: {}", e)));
        }

        config.server.base_url = config.server.base_url.trim_end_matches('/').to_string();

        Ok(config)
    }

    pub fn team_id(&self) -> &str {
        &self.team.team_id
    }

    pub fn other_user_id(&self) -> Option<&str> {
        self.team.other_user_id.as_deref()
    }

    pub fn locked_account(&self) -> Option<AccountCredentials> {
        self.locked.credentials()
    }

    pub fn inactive_account(&self) -> Option<AccountCredentials> {
        self.inactive.credentials()
    }
}
