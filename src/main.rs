// src/main.rs - video feed API server
mod config;
mod dtos;
mod errors;
mod handlers;
mod models;
mod repositories;
mod services;
#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use deadpool_postgres::Pool;
use log::{error, info, warn};

use crate::config::{AppConfig, SyncConfig};
use crate::repositories::post_repository::PostRepository;
use crate::services::sync_services::SyncService;

#[derive(Clone)]
pub struct AppState {
    pub pg_pool: Pool,
}

fn mask_token(k: &str) -> String {
    match (k.get(..4), k.get(k.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if k.len() > 8 => format!("{}***{}", head, tail),
        _ => "[REDACTED]".to_string(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let pg_pool = match config::get_pg_pool() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create PG pool: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = PostRepository::ensure_schema(&pg_pool).await {
        error!("Failed to prepare database schema: {}", e);
        std::process::exit(1);
    }

    // `video-feed-be sync` runs the collector once and exits
    if std::env::args().nth(1).as_deref() == Some("sync") {
        let Some(sync_config) = app_config.sync.clone() else {
            error!("API_BASE_URL and FLIC_TOKEN must be set to sync");
            std::process::exit(1);
        };
        info!("Flic token: {}", mask_token(&sync_config.flic_token));
        run_sync(sync_config, pg_pool).await;
        return Ok(());
    }

    if app_config.sync_on_startup {
        match app_config.sync.clone() {
            Some(sync_config) => {
                info!("Flic token: {}", mask_token(&sync_config.flic_token));
                tokio::spawn(run_sync(sync_config, pg_pool.clone()));
            }
            None => warn!("SYNC_ON_STARTUP is set but API_BASE_URL/FLIC_TOKEN are missing"),
        }
    }

    let state = web::Data::new(AppState { pg_pool });
    let allowed_origins = app_config.allowed_origins.clone();
    let bind_address = format!("0.0.0.0:{}", app_config.port);

    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "OPTIONS"])
            .allowed_headers(vec!["content-type", "accept", "x-requested-with"])
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::post_handlers::configure) // GET /, /health, /feed
    })
    .bind(&bind_address)?
    .run()
    .await
}

async fn run_sync(sync_config: SyncConfig, pg_pool: Pool) {
    let service = match SyncService::new(sync_config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to build sync client: {}", e);
            return;
        }
    };

    match service.run(&pg_pool).await {
        Ok(report) => info!(
            "Sync finished: {} pages, {} fetched, {} skipped, {} stored",
            report.pages, report.fetched, report.skipped, report.stored
        ),
        Err(e) => error!("Sync failed: {}", e),
    }
}
