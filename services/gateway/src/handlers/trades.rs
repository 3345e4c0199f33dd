use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::models::{
    ExportQuery, MessageResponse, SaveTradeRequest, TradeListResponse, TradeResponse, TradeView,
    messages,
};
use crate::state::AppState;
use crate::store::TradeRecord;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use std::fmt::Write as _;
use types::ids::TradeId;
use types::numeric::{round_money, round_position};

const CSV_HEADER: &str = "id,createdAt,exchange,symbol,direction,entryPrice,stopLoss,targetPrice,\
accountSize,riskPercent,positionSize,riskAmount,rewardAmount,riskRewardRatio,notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    fn parse(format: Option<&str>) -> Result<Self, AppError> {
        match format.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            Some(_) => Err(AppError::Validation(messages::UNSUPPORTED_FORMAT.to_string())),
        }
    }
}

/// Unknown and malformed ids are both reported as not found.
fn parse_trade_id(raw: &str) -> Result<TradeId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(messages::TRADE_NOT_FOUND.to_string()))
}

fn storage_error(e: crate::store::StoreError) -> AppError {
    AppError::InternalError(e.into())
}

/// Recalculates server-side; the client's own numbers are never trusted.
pub async fn save_trade(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<SaveTradeRequest>,
) -> Result<(StatusCode, Json<TradeResponse>), AppError> {
    let calculation = state.engine.evaluate(&req.request)?;
    let record = TradeRecord::new(user.user_id, calculation, req.notes);

    state
        .trades
        .insert(record.clone())
        .await
        .map_err(storage_error)?;

    tracing::info!(user_id = %user.user_id, trade_id = %record.id, "Trade saved");

    Ok((
        StatusCode::CREATED,
        Json(TradeResponse {
            success: true,
            trade: record.into(),
            message: Some(messages::TRADE_SAVED),
        }),
    ))
}

pub async fn list_trades(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<TradeListResponse>, AppError> {
    let trades = state
        .trades
        .list_for_user(&user.user_id)
        .await
        .map_err(storage_error)?;

    Ok(Json(TradeListResponse {
        success: true,
        trades: trades.into_iter().map(TradeView::from).collect(),
    }))
}

pub async fn get_trade(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(trade_id): Path<String>,
) -> Result<Json<TradeResponse>, AppError> {
    let trade_id = parse_trade_id(&trade_id)?;
    let record = state
        .trades
        .get(&user.user_id, &trade_id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| AppError::NotFound(messages::TRADE_NOT_FOUND.to_string()))?;

    Ok(Json(TradeResponse {
        success: true,
        trade: record.into(),
        message: None,
    }))
}

pub async fn delete_trade(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(trade_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let trade_id = parse_trade_id(&trade_id)?;
    let removed = state
        .trades
        .delete(&user.user_id, &trade_id)
        .await
        .map_err(storage_error)?;

    if !removed {
        return Err(AppError::NotFound(messages::TRADE_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = %user.user_id, trade_id = %trade_id, "Trade deleted");
    Ok(Json(MessageResponse {
        success: true,
        message: messages::TRADE_DELETED,
    }))
}

/// Download the caller's trades as a JSON array or CSV file.
pub async fn export_trades(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format = ExportFormat::parse(query.format.as_deref())?;
    let trades = state
        .trades
        .list_for_user(&user.user_id)
        .await
        .map_err(storage_error)?;

    let (content_type, filename, body) = match format {
        ExportFormat::Json => {
            let views: Vec<TradeView> = trades.into_iter().map(TradeView::from).collect();
            let body = serde_json::to_string_pretty(&views)
                .map_err(|e| AppError::InternalError(e.into()))?;
            ("application/json", "trades.json", body)
        }
        ExportFormat::Csv => ("text/csv; charset=utf-8", "trades.csv", to_csv(&trades)),
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

fn to_csv(trades: &[TradeRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for trade in trades {
        let calc = &trade.calculation;
        let fields = [
            trade.id.to_string(),
            trade.created_at.to_rfc3339(),
            csv_escape(&calc.exchange),
            csv_escape(&calc.symbol),
            csv_escape(&calc.direction),
            number(calc.entry_price),
            calc.stop_loss.map(number).unwrap_or_default(),
            calc.target_price.map(number).unwrap_or_default(),
            number(calc.account_size),
            number(calc.risk_percent),
            number(round_position(calc.position_size)),
            number(round_money(calc.risk_amount)),
            number(round_money(calc.reward_amount)),
            number(round_money(calc.risk_reward_ratio)),
            csv_escape(trade.notes.as_deref().unwrap_or_default()),
        ];
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}", fields.join(","));
    }
    out
}

fn number(value: Decimal) -> String {
    value.normalize().to_string()
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
