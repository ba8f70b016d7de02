//! Error types for the inventory server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::warn;

use crate::models::ErrorResponse;

/// Message shown to clients whenever the listing feed cannot be reached.
pub const INVENTORY_UNAVAILABLE: &str = "Failed to load inventory";

// == App Error Enum ==
/// Unified error type for the inventory server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Primary listing feed failed, timed out or answered with a non-success status
    #[error("Listing feed unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Status store failed; recovered locally by the aggregator, surfaced only
    /// by operations that write to the store
    #[error("Status store unavailable: {0}")]
    SecondaryUnavailable(String),

    /// Lookup by vehicle identifier found nothing
    #[error("Car not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::UpstreamUnavailable(detail) => {
                warn!(error = %detail, "listing feed request failed");
                (StatusCode::BAD_GATEWAY, INVENTORY_UNAVAILABLE.to_string())
            }
            AppError::SecondaryUnavailable(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the inventory server.
pub type Result<T> = std::result::Result<T, AppError>;
