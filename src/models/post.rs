// src/models/post.rs - Post record and its embedded owner/category/topic/token records

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post author as embedded in a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub username: String,
    pub picture_url: String,
    pub user_type: Option<String>,
    pub has_evm_wallet: bool,
    pub has_solana_wallet: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Number of posts in the category
    pub count: i64,
    pub description: String,
    pub image_url: String,
}

/// Topic creator. Uses `profile_url` where `Owner` uses `picture_url`,
/// and the wallet flags are not always sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicOwner {
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub username: String,
    pub profile_url: String,
    pub user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_evm_wallet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_solana_wallet: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub slug: String,
    pub is_public: bool,
    pub project_code: String,
    pub posts_count: i64,
    pub language: Option<String>,
    // "2025-02-15 15:02:41", unlike Post.created_at
    #[serde(with = "topic_timestamp")]
    pub created_at: NaiveDateTime,
    pub owner: TopicOwner,
}

/// Token metadata. Every field is an empty string when the post has no token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub owner: Owner,
    pub category: Category,
    pub topic: Topic,
    pub title: String,
    pub is_available_in_public_feed: bool,
    pub is_locked: bool,
    pub slug: String,
    pub upvoted: bool,
    pub bookmarked: bool,
    pub following: bool,
    pub identifier: String,
    pub comment_count: i64,
    pub upvote_count: i64,
    pub view_count: i64,
    pub exit_count: i64,
    pub rating_count: i64,
    pub average_rating: f64,
    pub share_count: i64,
    pub bookmark_count: i64,
    pub video_link: String,
    pub thumbnail_url: String,
    pub gif_thumbnail_url: String,
    pub contract_address: String,
    pub chain_id: String,
    pub chart_url: String,
    #[serde(rename = "baseToken")]
    pub base_token: BaseToken,
    /// Milliseconds since the Unix epoch on the wire
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub const TOPIC_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

mod topic_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TOPIC_TIMESTAMP_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TOPIC_TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TOPIC_TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
