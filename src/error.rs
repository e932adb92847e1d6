//! Unified error handling for the request handlers.
//!
//! Handlers return `AppResult<T>` so the `?` operator propagates failures,
//! which this module turns into plain HTML responses with the right status
//! code. Page loads never surface through here for data-access failures;
//! the index handler catches those itself and renders a remediation notice
//! instead.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Database connection pool error
    #[error("Database connection error")]
    ConnectionPool(#[source] diesel_async::pooled_connection::deadpool::PoolError),

    /// Access-layer failure (query rejected, row missing, store unreachable)
    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Environment configuration missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for AppError {
    fn from(err: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        AppError::ConnectionPool(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::ConnectionPool(e) => {
                tracing::error!("Connection pool error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database connection unavailable",
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Access-layer error: {:?}", e);
                // A missing row surfaces from the access layer wrapped in
                // anyhow; report it as not-found rather than a server bug.
                match e.downcast_ref::<diesel::result::Error>() {
                    Some(diesel::result::Error::NotFound) => {
                        (StatusCode::NOT_FOUND, "Resource not found")
                    }
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database operation failed",
                    ),
                }
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Page rendering failed")
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Server configuration error",
                )
            }
        };

        let body = Html(format!(
            "<!doctype html><html><head><title>{status}</title></head>\
             <body><h1>{status}</h1><p>{message}</p>\
             <p><a href=\"/\">Back to tasks</a></p></body></html>"
        ));

        (status, body).into_response()
    }
}

/// Result type alias for request handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_row_maps_to_not_found() {
        let err = AppError::Internal(anyhow::Error::from(diesel::result::Error::NotFound));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_config_error_maps_to_service_unavailable() {
        let err = AppError::Config("DATABASE_URL is not configured".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
