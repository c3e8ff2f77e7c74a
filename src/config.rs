use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime};
use tokio_postgres::NoTls;

// defaults line up with the `db` service in docker-compose.yml
const DEFAULT_PG_HOST: &str = "localhost";
const DEFAULT_PG_PORT: u16 = 5432;
const DEFAULT_PG_USER: &str = "user";
const DEFAULT_PG_PASS: &str = "password";
const DEFAULT_PG_DB: &str = "video_recommendations";

pub fn get_pg_pool() -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(env::var("PG_HOST").unwrap_or_else(|_| DEFAULT_PG_HOST.into()));
    cfg.port = Some(parse_var("PG_PORT", DEFAULT_PG_PORT)?);
    cfg.user = Some(env::var("PG_USER").unwrap_or_else(|_| DEFAULT_PG_USER.into()));
    cfg.password = Some(env::var("PG_PASS").unwrap_or_else(|_| DEFAULT_PG_PASS.into()));
    cfg.dbname = Some(env::var("PG_DB").unwrap_or_else(|_| DEFAULT_PG_DB.into()));
    cfg.connect_timeout = Some(Duration::from_secs(5));

    let mut pool_cfg = PoolConfig::default();
    pool_cfg.max_size = 16;
    cfg.pool = Some(pool_cfg);

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .context("failed to create postgres pool")
}

/// Settings for the collector that pulls posts from the upstream API.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api_base_url: String,
    pub flic_token: String,
    pub page_size: u32,
    /// `None` means follow pages until the upstream returns an empty one
    pub max_pages: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub sync_on_startup: bool,
    /// Present only when both API_BASE_URL and FLIC_TOKEN are set
    pub sync: Option<SyncConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let sync = match (env::var("API_BASE_URL"), env::var("FLIC_TOKEN")) {
            (Ok(api_base_url), Ok(flic_token)) => {
                let max_pages: u32 = parse_var("SYNC_MAX_PAGES", 10)?;
                Some(SyncConfig {
                    api_base_url: api_base_url.trim().trim_end_matches('/').to_string(),
                    flic_token: flic_token.trim().to_string(),
                    page_size: parse_var("SYNC_PAGE_SIZE", 100)?,
                    max_pages: (max_pages > 0).then_some(max_pages),
                })
            }
            _ => None,
        };

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            allowed_origins,
            sync_on_startup: parse_var("SYNC_ON_STARTUP", false)?,
            sync,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        _ => Ok(default),
    }
}
