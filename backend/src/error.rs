use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::quote::FetchError;

/// Why one ingestion cycle did not produce an external observation.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("persistence error: {0:#}")]
    Persistence(anyhow::Error),
}

/// Errors surfaced by the REST handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
