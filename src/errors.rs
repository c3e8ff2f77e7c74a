// src/errors.rs - request failures rendered as the feed status envelope

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use log::error;
use thiserror::Error;

use crate::dtos::feed::FeedResponse;
use crate::repositories::post_repository::RepositoryError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("failed to retrieve posts")]
    Repository(#[from] RepositoryError),
    #[error("database unavailable")]
    Unavailable(RepositoryError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // client sees the short message, the cause goes to the log
        match self {
            ApiError::Repository(cause) | ApiError::Unavailable(cause) => {
                error!("{}: {}", self, cause);
            }
            ApiError::Validation(_) => {}
        }

        HttpResponse::build(self.status_code()).json(FeedResponse::error(self.to_string()))
    }
}
