// Membership scenarios: add and remove a second user
use super::common::{headers, skip, CONTEXT};
use mattermost_api_suite::models::mattermost::{contains_member, ChannelMember};
use reqwest::StatusCode;

const SKIP_REASON: &str = "MATTERMOST_OTHER_USER_ID not set";

#[tokio::test]
#[ignore] // Requires a real Mattermost server and a second user
async fn test_add_user_to_channel_success() -> anyhow::Result<()> {
    let Some(user_id) = CONTEXT.config.other_user_id() else {
        skip("add user test", SKIP_REASON);
        return Ok(());
    };
    let headers = &headers().await?;

    CONTEXT
        .channels(headers)
        .scope(|channel| async move {
            CONTEXT
                .membership(headers)
                .ensure_absent(&channel.id, user_id)
                .await?;

            let member: ChannelMember = CONTEXT
                .client
                .add_channel_member(headers, &channel.id, user_id)
                .await?
                .expect_status(StatusCode::CREATED)?
                .json()?;
            assert_eq!(member.user_id, user_id, "Added user id differs");
            assert_eq!(member.channel_id, channel.id, "Membership in another channel");

            let members: Vec<ChannelMember> = CONTEXT
                .client
                .channel_members(headers, &channel.id)
                .await?
                .expect_status(StatusCode::OK)?
                .json()?;
            assert!(
                contains_member(&members, user_id),
                "User {user_id} not listed after being added"
            );
            Ok::<_, anyhow::Error>(())
        })
        .await??;

    Ok(())
}

#[tokio::test]
#[ignore] // Requires a real Mattermost server and a second user
async fn test_remove_user_from_channel_success() -> anyhow::Result<()> {
    let Some(user_id) = CONTEXT.config.other_user_id() else {
        skip("remove user test", SKIP_REASON);
        return Ok(());
    };
    let headers = &headers().await?;

    CONTEXT
        .channels(headers)
        .scope(|channel| async move {
            CONTEXT
                .membership(headers)
                .ensure_present(&channel.id, user_id)
                .await?;

            CONTEXT
                .client
                .remove_channel_member(headers, &channel.id, user_id)
                .await?
                .expect_status(StatusCode::OK)?;

            let members: Vec<ChannelMember> = CONTEXT
                .client
                .channel_members(headers, &channel.id)
                .await?
                .expect_status(StatusCode::OK)?
                .json()?;
            assert!(
                !contains_member(&members, user_id),
                "User {user_id} still listed after removal"
            );
            Ok::<_, anyhow::Error>(())
        })
        .await??;

    Ok(())
}
