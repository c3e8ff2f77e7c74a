// src/services/sync_services.rs - pulls posts from the upstream post API into Postgres

use std::time::Duration;

use deadpool_postgres::Pool;
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::config::SyncConfig;
use crate::models::Post;
use crate::repositories::post_repository::{PostRepository, RepositoryError};

const POSTS_ENDPOINT: &str = "/posts/summary/get";
const PAGE_DELAY: Duration = Duration::from_millis(200);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub pages: u32,
    pub fetched: usize,
    pub skipped: usize,
    pub stored: u64,
}

#[derive(Clone)]
pub struct SyncService {
    client: Client,
    config: SyncConfig,
}

impl SyncService {
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .user_agent("video-feed-be/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Walk the upstream pages and upsert every post that parses.
    ///
    /// A failed page ends the walk but keeps what was already stored;
    /// only storage failures are returned as errors.
    pub async fn run(&self, pool: &Pool) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        let mut page = 1;

        loop {
            if let Some(max) = self.config.max_pages {
                if page > max {
                    info!("reached page limit of {}, stopping sync", max);
                    break;
                }
            }

            let items = match self.fetch_page(page).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("sync stopped at page {}: {}", page, e);
                    break;
                }
            };
            if items.is_empty() {
                info!("page {} is empty, sync complete", page);
                break;
            }

            let (posts, skipped) = parse_posts(items);
            report.pages += 1;
            report.fetched += posts.len() + skipped;
            report.skipped += skipped;
            report.stored += PostRepository::upsert_many(pool, &posts).await?;

            info!(
                "page {}: stored {} posts, skipped {} (total stored {})",
                page,
                posts.len(),
                skipped,
                report.stored
            );

            page += 1;
            tokio::time::sleep(PAGE_DELAY).await;
        }

        Ok(report)
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<Value>, SyncError> {
        let url = format!("{}{}", self.config.api_base_url, POSTS_ENDPOINT);

        let resp = self
            .client
            .get(&url)
            .header("Flic-Token", &self.config.flic_token)
            .query(&[("page", page), ("limit", self.config.page_size)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Upstream(format!("{} {}", status, body)));
        }

        let body: Value = resp.json().await?;
        Ok(extract_items(body))
    }
}

/// Upstream responses carry their list under `posts`, `post` or `data`.
pub fn extract_items(body: Value) -> Vec<Value> {
    let Value::Object(mut map) = body else {
        return Vec::new();
    };

    for key in ["posts", "post", "data"] {
        if let Some(Value::Array(items)) = map.remove(key) {
            if !items.is_empty() {
                return items;
            }
        }
    }
    Vec::new()
}

/// Returns the posts that parsed and how many items were skipped.
pub fn parse_posts(items: Vec<Value>) -> (Vec<Post>, usize) {
    let mut posts = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for item in items {
        let id = item.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<Post>(item) {
            Ok(post) => posts.push(post),
            Err(e) => {
                warn!("skipping upstream post {}: {}", id, e);
                skipped += 1;
            }
        }
    }

    (posts, skipped)
}
