// src/handlers/post_handlers.rs - feed, health and liveness routes

use actix_web::{HttpResponse, get, web};
use log::info;
use serde_json::json;

use crate::AppState;
use crate::dtos::feed::{FeedQuery, FeedResponse};
use crate::errors::ApiError;
use crate::repositories::post_repository::PostRepository;

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Video feed API is running" }))
}

/// GET /health
/// Checks that a pooled database connection answers.
#[get("/health")]
pub async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    PostRepository::ping(&app_state.pg_pool)
        .await
        .map_err(ApiError::Unavailable)?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

/// GET /feed?username=&project_code=&tag=&page=&page_size=
#[get("/feed")]
pub async fn get_feed(
    app_state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = query.into_inner().into_filter().map_err(ApiError::Validation)?;
    let posts = PostRepository::list(&app_state.pg_pool, &filter).await?;

    info!(
        "feed page {} (size {}) -> {} posts",
        filter.page,
        filter.page_size,
        posts.len()
    );

    Ok(HttpResponse::Ok().json(FeedResponse::success(posts)))
}

/// Malformed query strings get the same envelope as other failures.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .service(index)
        .service(health)
        .service(get_feed);
}
