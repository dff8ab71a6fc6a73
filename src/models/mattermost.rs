use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    #[serde(rename = "O")]
    Open,
    #[serde(rename = "P")]
    Private,
    #[serde(rename = "D")]
    Direct,
    #[serde(rename = "G")]
    Group,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub login_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreateChannelRequest {
    pub team_id: String,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
}

impl CreateChannelRequest {
    /// A public channel whose display name is derived from `name`.
    pub fn public(team_id: impl Into<String>, name: impl Into<String>, display_prefix: &str) -> Self {
        let name = name.into();
        Self {
            team_id: team_id.into(),
            display_name: format!("{} {}", display_prefix, name),
            name,
            channel_type: ChannelType::Open,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub team_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreatePostRequest {
    pub channel_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub channel_id: String,
    pub message: String,
    #[serde(default)]
    pub user_id: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub create_at: i64,
}

impl Post {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.create_at)
    }
}

/// `GET /channels/{id}/posts` payload: posts keyed by id plus their display order.
#[derive(Debug, Deserialize, Clone)]
pub struct PostList {
    pub posts: HashMap<String, Post>,
    pub order: Vec<String>,
}

impl PostList {
    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.get(post_id)
    }

    /// Posts in server order; ids missing from `posts` are skipped.
    pub fn ordered(&self) -> impl Iterator<Item = &Post> {
        self.order.iter().filter_map(|id| self.posts.get(id))
    }
}

#[derive(Debug, Serialize)]
pub struct AddMemberRequest<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChannelMember {
    pub channel_id: String,
    pub user_id: String,
}

pub fn contains_member(members: &[ChannelMember], user_id: &str) -> bool {
    members.iter().any(|member| member.user_id == user_id)
}
