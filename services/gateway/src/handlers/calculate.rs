use crate::error::AppError;
use crate::extract::ApiJson;
use crate::models::{CalculationResponse, messages};
use crate::state::AppState;
use axum::{Json, extract::State};
use types::risk::RiskRequest;

pub async fn calculate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RiskRequest>,
) -> Result<Json<CalculationResponse>, AppError> {
    let calculation = state.engine.evaluate(&request)?;

    tracing::debug!(
        exchange = %calculation.exchange,
        symbol = %calculation.symbol,
        position_size = %calculation.position_size,
        "Risk calculated"
    );

    Ok(Json(CalculationResponse {
        success: true,
        calculation,
        message: messages::CALCULATION_OK,
    }))
}
