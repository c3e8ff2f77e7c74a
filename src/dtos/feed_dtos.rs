use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Post;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query string accepted by `GET /feed`.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub username: Option<String>,
    pub project_code: Option<String>,
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page_size: Option<u32>,
}

// `?page=` arrives as an empty string; treat it like a missing key.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Validated selection handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub username: Option<String>,
    pub project_code: Option<String>,
    pub tag: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl PostFilter {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            username: None,
            project_code: None,
            tag: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FeedQuery {
    pub fn into_filter(self) -> Result<PostFilter, String> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err("page must be 1 or greater".to_string());
        }

        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(format!("page_size must be between 1 and {}", MAX_PAGE_SIZE));
        }

        Ok(PostFilter {
            username: non_blank(self.username),
            project_code: non_blank(self.project_code),
            tag: non_blank(self.tag),
            page,
            page_size,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Success,
    Error,
}

/// Response envelope: `{ "status": ..., "post": [...] }`.
/// `message` only appears on failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub status: FeedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub post: Vec<Post>,
}

impl FeedResponse {
    pub fn success(post: Vec<Post>) -> Self {
        Self {
            status: FeedStatus::Success,
            message: None,
            post,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: FeedStatus::Error,
            message: Some(message.into()),
            post: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web;
    use serde_json::json;

    fn parse_query(query: &str) -> Result<FeedQuery, actix_web::error::QueryPayloadError> {
        web::Query::<FeedQuery>::from_query(query).map(web::Query::into_inner)
    }

    #[test]
    fn empty_pagination_values_mean_defaults() {
        let query = parse_query("page=&page_size=%20&tag=").unwrap();
        assert_eq!(query.page, None);
        assert_eq!(query.page_size, None);
        assert_eq!(query.into_filter().unwrap(), PostFilter::default());
    }

    #[test]
    fn pagination_values_parse_from_query_string() {
        let query = parse_query("page=2&page_size=50&project_code=flic").unwrap();
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.page, 2);
        assert_eq!(filter.page_size, 50);
        assert_eq!(filter.project_code.as_deref(), Some("flic"));
    }

    #[test]
    fn non_numeric_page_is_rejected() {
        assert!(parse_query("page=abc").is_err());
        assert!(parse_query("page_size=-1").is_err());
    }

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let filter = FeedQuery::default().into_filter().unwrap();
        assert_eq!(filter, PostFilter::default());
        assert_eq!(filter.limit(), 20);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn offset_follows_page() {
        let query = FeedQuery {
            page: Some(3),
            page_size: Some(25),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.limit(), 25);
        assert_eq!(filter.offset(), 50);
    }

    #[test]
    fn rejects_out_of_range_pagination() {
        for (page, page_size) in [(Some(0), None), (None, Some(0)), (None, Some(101))] {
            let query = FeedQuery {
                page,
                page_size,
                ..Default::default()
            };
            assert!(query.into_filter().is_err(), "{:?}/{:?}", page, page_size);
        }
    }

    #[test]
    fn accepts_max_page_size() {
        let query = FeedQuery {
            page_size: Some(MAX_PAGE_SIZE),
            ..Default::default()
        };
        assert_eq!(query.into_filter().unwrap().page_size, 100);
    }

    #[test]
    fn blank_filters_are_dropped_and_trimmed() {
        let query = FeedQuery {
            username: Some("   ".to_string()),
            project_code: Some(" flic ".to_string()),
            tag: Some(String::new()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.username, None);
        assert_eq!(filter.project_code.as_deref(), Some("flic"));
        assert_eq!(filter.tag, None);
    }

    #[test]
    fn success_envelope_has_no_message() {
        let value = serde_json::to_value(FeedResponse::success(Vec::new())).unwrap();
        assert_eq!(value, json!({ "status": "success", "post": [] }));
    }

    #[test]
    fn error_envelope_keeps_empty_post_list() {
        let value = serde_json::to_value(FeedResponse::error("database unavailable")).unwrap();
        assert_eq!(
            value,
            json!({ "status": "error", "message": "database unavailable", "post": [] })
        );
    }

    #[test]
    fn documented_example_envelope_parses() {
        let response: FeedResponse =
            serde_json::from_str(include_str!("../../fixtures/feed_example.json")).unwrap();
        assert_eq!(response.status, FeedStatus::Success);
        assert_eq!(response.post.len(), 1);
        assert_eq!(response.message, None);
    }

    #[test]
    fn empty_post_list_parses() {
        let response: FeedResponse =
            serde_json::from_str(r#"{ "status": "success", "post": [] }"#).unwrap();
        assert!(response.post.is_empty());
    }
}
