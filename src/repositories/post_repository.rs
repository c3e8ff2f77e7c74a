// src/repositories/post_repository.rs - Post storage on Postgres (one JSONB document per post)

use deadpool_postgres::{Pool, PoolError};
use log::{debug, info};
use thiserror::Error;
use tokio_postgres::types::Json;

use crate::dtos::feed::PostFilter;
use crate::models::Post;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

pub struct PostRepository;

// Filter columns are copies of fields inside `document`, kept so the
// feed query can use indexes.
const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS posts (
        id             BIGINT PRIMARY KEY,
        owner_username TEXT NOT NULL,
        project_code   TEXT NOT NULL,
        tags           TEXT[] NOT NULL DEFAULT '{}',
        created_at     TIMESTAMPTZ NOT NULL,
        document       JSONB NOT NULL,
        synced_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    );
    CREATE INDEX IF NOT EXISTS ix_posts_owner_username ON posts (owner_username);
    CREATE INDEX IF NOT EXISTS ix_posts_project_code ON posts (project_code);
    CREATE INDEX IF NOT EXISTS ix_posts_created_at ON posts (created_at DESC, id DESC);
";

const LIST_SQL: &str = "
    SELECT document FROM posts
    WHERE ($1::TEXT IS NULL OR owner_username = $1)
      AND ($2::TEXT IS NULL OR project_code = $2)
      AND ($3::TEXT IS NULL OR EXISTS (
            SELECT 1 FROM unnest(tags) AS t(tag) WHERE lower(t.tag) = lower($3)
          ))
    ORDER BY created_at DESC, id DESC
    LIMIT $4 OFFSET $5
";

const UPSERT_SQL: &str = "
    INSERT INTO posts (id, owner_username, project_code, tags, created_at, document, synced_at)
    VALUES ($1, $2, $3, $4, $5, $6, now())
    ON CONFLICT (id) DO UPDATE SET
        owner_username = EXCLUDED.owner_username,
        project_code   = EXCLUDED.project_code,
        tags           = EXCLUDED.tags,
        created_at     = EXCLUDED.created_at,
        document       = EXCLUDED.document,
        synced_at      = now()
";

impl PostRepository {
    /// Create the posts table and its indexes if they are missing.
    pub async fn ensure_schema(pool: &Pool) -> Result<(), RepositoryError> {
        let client = pool.get().await?;
        client.batch_execute(SCHEMA_SQL).await?;
        info!("posts table ready");
        Ok(())
    }

    /// Newest posts first, filtered and paginated by `filter`.
    pub async fn list(pool: &Pool, filter: &PostFilter) -> Result<Vec<Post>, RepositoryError> {
        let client = pool.get().await?;
        let stmt = client.prepare_cached(LIST_SQL).await?;

        let rows = client
            .query(
                &stmt,
                &[
                    &filter.username,
                    &filter.project_code,
                    &filter.tag,
                    &filter.limit(),
                    &filter.offset(),
                ],
            )
            .await?;

        debug!("feed query {:?} returned {} rows", filter, rows.len());

        rows.iter()
            .map(|row| -> Result<Post, RepositoryError> {
                let Json(post): Json<Post> = row.try_get("document")?;
                Ok(post)
            })
            .collect()
    }

    /// Insert or replace posts by id in one transaction. Returns rows written.
    pub async fn upsert_many(pool: &Pool, posts: &[Post]) -> Result<u64, RepositoryError> {
        if posts.is_empty() {
            return Ok(0);
        }

        let mut client = pool.get().await?;
        let tx = client.transaction().await?;
        let stmt = tx.prepare_cached(UPSERT_SQL).await?;

        let mut written = 0;
        for post in posts {
            written += tx
                .execute(
                    &stmt,
                    &[
                        &post.id,
                        &post.owner.username,
                        &post.topic.project_code,
                        &post.tags,
                        &post.created_at,
                        &Json(post),
                    ],
                )
                .await?;
        }
        tx.commit().await?;

        debug!("upserted {} posts", written);
        Ok(written)
    }

    pub async fn ping(pool: &Pool) -> Result<(), RepositoryError> {
        let client = pool.get().await?;
        client.execute("SELECT 1", &[]).await?;
        Ok(())
    }
}
