// src/test_support.rs - shared helpers for the in-file test modules

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use deadpool_postgres::{Config, Pool, Runtime};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::OnceCell;
use tokio_postgres::NoTls;

use crate::models::Post;
use crate::repositories::post_repository::PostRepository;

pub fn example_post_json() -> Value {
    let envelope: Value =
        serde_json::from_str(include_str!("../fixtures/feed_example.json")).unwrap();
    envelope["post"][0].clone()
}

/// The fixture post with the fields the feed filters and orders on replaced.
pub fn sample_post(id: i64, created_ms: i64, username: &str, project_code: &str, tags: &[&str]) -> Post {
    let mut post: Post = serde_json::from_value(example_post_json()).unwrap();
    post.id = id;
    post.created_at = Utc.timestamp_millis_opt(created_ms).unwrap();
    post.owner.username = username.to_string();
    post.topic.project_code = project_code.to_string();
    post.tags = tags.iter().map(|t| t.to_string()).collect();
    post
}

// Nothing listens on port 1, so every checkout fails fast.
pub fn unreachable_pool() -> Pool {
    let mut cfg = Config::new();
    cfg.host = Some("127.0.0.1".into());
    cfg.port = Some(1);
    cfg.user = Some("user".into());
    cfg.password = Some("password".into());
    cfg.dbname = Some("video_recommendations".into());
    cfg.connect_timeout = Some(Duration::from_secs(1));
    cfg.create_pool(Some(Runtime::Tokio1), NoTls).unwrap()
}

/// Pool built from the PG_* variables (docker-compose defaults), schema ready.
/// Only used by `#[ignore]`d tests: `cargo test -- --ignored` with `db` running.
pub async fn live_pool() -> Pool {
    // concurrent CREATE TABLE IF NOT EXISTS can still collide on first run
    static SCHEMA: OnceCell<()> = OnceCell::const_new();

    dotenv::dotenv().ok();
    let pool = crate::config::get_pg_pool().unwrap();
    SCHEMA
        .get_or_init(|| async { PostRepository::ensure_schema(&pool).await.unwrap() })
        .await;
    pool
}

pub async fn delete_posts(pool: &Pool, ids: &[i64]) {
    let client = pool.get().await.unwrap();
    client
        .execute("DELETE FROM posts WHERE id = ANY($1)", &[&ids])
        .await
        .unwrap();
}

/// Minimal HTTP upstream: answers the n-th request with the n-th canned
/// `(status, body)` and an empty post list once those run out.
pub struct MockUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub async fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            let mut served = 0;
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };

                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => raw.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&raw);
                let request_line = head.lines().next().unwrap_or_default().to_string();
                seen.lock().unwrap().push(request_line);

                let (status, body) = responses
                    .get(served)
                    .cloned()
                    .unwrap_or((200, r#"{"post":[]}"#.to_string()));
                served += 1;

                let reply = format!(
                    "HTTP/1.1 {} MOCK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { base_url, requests }
    }

    /// Request lines seen so far, e.g. `GET /posts/summary/get?page=1&limit=100 HTTP/1.1`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}
