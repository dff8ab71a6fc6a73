// Channel scenarios: creation through the scoped fixture and duplicate names
use super::common::{headers, CONTEXT};
use anyhow::Context;
use mattermost_api_suite::models::mattermost::{Channel, ChannelType, CreateChannelRequest};
use mattermost_api_suite::services::channels::{cleanup_channel, unique_channel_name};
use reqwest::StatusCode;

const DUPLICATE_NAME_PREFIX: &str = "duplicate-test";
const DUPLICATE_DISPLAY_PREFIX: &str = "Duplicate name test channel";

/// Any of these in the error body identifies a duplicate-name rejection.
const DUPLICATE_MARKERS: [&str; 3] = [
    "store.sql_channel.save_channel.exists.app_error",
    "channel with that name already exists",
    "канал с таким названием уже существует",
];

#[tokio::test]
#[ignore] // Requires a real Mattermost server
async fn test_create_channel_success() -> anyhow::Result<()> {
    let headers = headers().await?;
    let team_id = CONTEXT.config.team_id();

    CONTEXT
        .channels(&headers)
        .scope(|channel| async move {
            assert!(!channel.id.is_empty(), "Channel id missing from response");
            assert!(
                channel.name.starts_with("test-auto-"),
                "Unexpected channel name: {}",
                channel.name
            );
            assert_eq!(channel.team_id, team_id, "Channel created in the wrong team");
            assert_eq!(channel.channel_type, ChannelType::Open);
        })
        .await?;

    Ok(())
}

#[tokio::test]
#[ignore] // Requires a real Mattermost server
async fn test_create_channel_duplicate_name() -> anyhow::Result<()> {
    let headers = headers().await?;
    let name = unique_channel_name(DUPLICATE_NAME_PREFIX);
    let payload =
        CreateChannelRequest::public(CONTEXT.config.team_id(), &name, DUPLICATE_DISPLAY_PREFIX);

    // First creation must succeed; only its id is needed, so read nothing else
    let created = CONTEXT
        .client
        .create_channel(&headers, &payload)
        .await?
        .expect_status(StatusCode::CREATED)?;
    let first_id = created.json::<serde_json::Value>()?["id"]
        .as_str()
        .map(str::to_owned)
        .with_context(|| format!("Channel {name} created without an id: {}", created.body_excerpt()))?;

    // Second creation with the same name, cleaned up before asserting
    let second = CONTEXT.client.create_channel(&headers, &payload).await;
    let outcome = cleanup_channel(&CONTEXT.client, &headers, &first_id).await;
    if !outcome.is_clean() {
        eprintln!("⚠️  First duplicate-test channel {first_id} not cleaned up: {outcome:?}");
    }

    let second = second?;
    if second.status == StatusCode::CREATED {
        if let Ok(extra) = second.json::<Channel>() {
            cleanup_channel(&CONTEXT.client, &headers, &extra.id).await;
        }
    }

    assert!(
        matches!(
            second.status,
            StatusCode::BAD_REQUEST | StatusCode::INTERNAL_SERVER_ERROR
        ),
        "Expected 400 or 500 for a duplicate name, got {}: {}",
        second.status,
        second.body_excerpt()
    );
    assert!(
        DUPLICATE_MARKERS
            .iter()
            .any(|marker| second.body_contains_ignore_case(marker)),
        "Duplicate-name message not found in: {}",
        second.body_excerpt()
    );
    Ok(())
}
