use crate::error::AppError;
use crate::models::{
    ExchangesResponse, PriceQuery, QuoteResponse, QuotesResponse, SymbolsQuery, SymbolsResponse,
    messages,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use market_data::quote::normalize_exchange;

fn required_exchange(exchange: Option<String>) -> Result<String, AppError> {
    exchange
        .map(|e| normalize_exchange(&e))
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation(messages::MISSING_EXCHANGE.to_string()))
}

pub async fn list_exchanges(
    State(state): State<AppState>,
) -> Result<Json<ExchangesResponse>, AppError> {
    let exchanges = state.prices.exchanges().await?;
    Ok(Json(ExchangesResponse {
        success: true,
        exchanges,
    }))
}

pub async fn list_symbols(
    State(state): State<AppState>,
    Query(query): Query<SymbolsQuery>,
) -> Result<Json<SymbolsResponse>, AppError> {
    let exchange = required_exchange(query.exchange)?;
    let symbols = state.prices.symbols(&exchange).await?;
    Ok(Json(SymbolsResponse {
        success: true,
        exchange,
        symbols,
    }))
}

/// One quote when `symbol` is given, otherwise every quote on the exchange.
pub async fn prices(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Result<Response, AppError> {
    let exchange = required_exchange(query.exchange)?;

    match query.symbol.filter(|s| !s.trim().is_empty()) {
        Some(symbol) => {
            let quote = state.prices.quote(&exchange, &symbol).await?;
            Ok(Json(QuoteResponse {
                success: true,
                quote,
            })
            .into_response())
        }
        None => {
            let quotes = state.prices.quotes(&exchange).await?;
            Ok(Json(QuotesResponse {
                success: true,
                quotes,
            })
            .into_response())
        }
    }
}
