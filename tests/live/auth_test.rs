// Login scenarios: valid, invalid, locked, inactive and unreachable server
use super::common::{skip, CONTEXT};
use mattermost_api_suite::client::ApiClient;
use mattermost_api_suite::config::AccountCredentials;
use mattermost_api_suite::services::channels::unique_suffix;
use mattermost_api_suite::services::session::authenticate;
use reqwest::StatusCode;
use std::time::Duration;

const UNREACHABLE_BASE_URL: &str = "http://localhost:9999";

#[tokio::test]
#[ignore] // Requires a real Mattermost server
async fn test_successful_authentication() -> anyhow::Result<()> {
    let token = CONTEXT.session.token(&CONTEXT.client).await?;

    assert!(
        !token.as_str().is_empty(),
        "Token must not be empty after a successful login"
    );
    Ok(())
}

#[tokio::test]
#[ignore] // Requires a real Mattermost server
async fn test_authentication_invalid_credentials() {
    let mut suffix = unique_suffix();
    suffix.truncate(6);
    let credentials =
        AccountCredentials::new(format!("invalid_user_{suffix}"), "invalid_password");

    let err = authenticate(&CONTEXT.client, &credentials)
        .await
        .expect_err("Login with invalid credentials must fail");

    assert_eq!(
        err.status(),
        Some(StatusCode::UNAUTHORIZED),
        "Expected 401 for invalid credentials, got: {err}"
    );
}

#[tokio::test]
#[ignore] // Requires a real Mattermost server and a locked account
async fn test_authentication_locked_account() {
    let Some(credentials) = CONTEXT.config.locked_account() else {
        skip(
            "locked account test",
            "MATTERMOST_LOCKED_USER_LOGIN/PASSWORD not set",
        );
        return;
    };

    let err = authenticate(&CONTEXT.client, &credentials)
        .await
        .expect_err("Login with a locked account must fail");

    assert_eq!(
        err.status(),
        Some(StatusCode::UNAUTHORIZED),
        "Expected 401 for a locked account, got: {err}"
    );
}

#[tokio::test]
#[ignore] // Requires a real Mattermost server and an inactive account
async fn test_authentication_inactive_account() {
    let Some(credentials) = CONTEXT.config.inactive_account() else {
        skip(
            "inactive account test",
            "MATTERMOST_INACTIVE_USER_LOGIN/PASSWORD not set",
        );
        return;
    };

    let err = authenticate(&CONTEXT.client, &credentials)
        .await
        .expect_err("Login with an inactive account must fail");

    assert_eq!(
        err.status(),
        Some(StatusCode::UNAUTHORIZED),
        "Expected 401 for an inactive account, got: {err}"
    );
}

#[tokio::test]
#[ignore] // Part of the live suite; needs nothing listening on localhost:9999
async fn test_authentication_server_unreachable() -> anyhow::Result<()> {
    let client = ApiClient::with_timeouts(
        UNREACHABLE_BASE_URL,
        Duration::from_secs(1),
        Duration::from_secs(1),
    )?;
    let credentials = AccountCredentials::new("any_user", "any_password");

    let err = authenticate(&client, &credentials)
        .await
        .expect_err("Login against an unreachable server must fail");

    assert!(
        err.is_transport(),
        "Expected a connection or timeout error, got: {err}"
    );
    Ok(())
}
