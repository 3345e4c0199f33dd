use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::StatsResponse;
use crate::state::AppState;
use axum::{Json, extract::State};
use types::risk::RiskCalculation;

pub async fn stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<StatsResponse>, AppError> {
    let calculations: Vec<RiskCalculation> = state
        .trades
        .list_for_user(&user.user_id)
        .await
        .map_err(|e| AppError::InternalError(e.into()))?
        .into_iter()
        .map(|record| record.calculation)
        .collect();

    Ok(Json(StatsResponse {
        success: true,
        stats: risk_engine::summarize(&calculations),
    }))
}
