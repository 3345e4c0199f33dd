use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::messages;

/// `Json<T>` whose rejection is a 400 in the standard error envelope.
///
/// Axum's own rejection answers with plain text (and 415/422 status codes);
/// clients here expect `{ success: false, message }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(reject(rejection)),
        }
    }
}

fn reject(rejection: JsonRejection) -> AppError {
    tracing::debug!(
        status = %rejection.status(),
        reason = %rejection.body_text(),
        "Rejected request body"
    );
    AppError::Validation(messages::INVALID_BODY.to_string())
}
