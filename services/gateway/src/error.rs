use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use market_data::MarketDataError;
use serde_json::json;
use thiserror::Error;
use types::errors::CalculationError;

use crate::models::messages;

/// Central error type for the Gateway application
///
/// The `Display` text of every variant except `InternalError` is shown to
/// the caller as-is.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    RateLimitExceeded { message: String, retry_after_secs: u64 },

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<CalculationError> for AppError {
    fn from(err: CalculationError) -> Self {
        tracing::debug!(fields = ?err.fields(), "Rejected calculation request: {}", err);
        AppError::Validation(err.to_string())
    }
}

impl From<MarketDataError> for AppError {
    fn from(err: MarketDataError) -> Self {
        match err {
            e if e.is_not_found() => AppError::NotFound(e.to_string()),
            MarketDataError::Upstream(reason) => {
                tracing::warn!(%reason, "Price feed unavailable");
                AppError::ServiceUnavailable(messages::PRICE_FEED_UNAVAILABLE.to_string())
            }
            other => AppError::InternalError(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, retry_after) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::RateLimitExceeded {
                message,
                retry_after_secs,
            } => (StatusCode::TOO_MANY_REQUESTS, message, Some(retry_after_secs)),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, None),
            AppError::InternalError(err) => {
                // Detail stays in the logs only.
                tracing::error!(error = ?err, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    messages::INTERNAL_ERROR.to_string(),
                    None,
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message
        }));

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Shared 405 handler for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": messages::METHOD_NOT_ALLOWED })),
    )
        .into_response()
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> AppError {
    AppError::NotFound(messages::ROUTE_NOT_FOUND.to_string())
}
