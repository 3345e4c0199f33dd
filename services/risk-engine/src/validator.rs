//! Input validation for risk calculations
//!
//! Turns a loosely-typed `RiskRequest` into `RiskParameters`. Required
//! fields that are absent or falsy fail the whole request; optional fields
//! that are absent or falsy are simply treated as not supplied.

use rust_decimal::Decimal;
use serde_json::Value;
use types::errors::CalculationError;
use types::numeric::{is_falsy, parse_decimal};
use types::risk::{RiskParameters, RiskRequest};

/// Required fields, in the order they are reported.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "exchange",
    "symbol",
    "direction",
    "entryPrice",
    "accountSize",
    "riskPercent",
];

/// Validate a request and coerce its values.
///
/// Checks performed (in order):
/// 1. Every required field is present and truthy
/// 2. Text fields are strings (numbers are accepted and stringified)
/// 3. Numeric fields parse as decimals
///
/// No bounds checking is done: negative or huge percentages pass through.
pub fn validate_request(request: &RiskRequest) -> Result<RiskParameters, CalculationError> {
    let missing = missing_fields(request);
    if !missing.is_empty() {
        return Err(CalculationError::MissingRequiredFields { fields: missing });
    }

    Ok(RiskParameters {
        exchange: required_text("exchange", &request.exchange)?,
        symbol: required_text("symbol", &request.symbol)?,
        direction: required_text("direction", &request.direction)?,
        entry_price: required_number("entryPrice", &request.entry_price)?,
        stop_loss: optional_number("stopLoss", &request.stop_loss)?,
        target_price: optional_number("targetPrice", &request.target_price)?,
        account_size: required_number("accountSize", &request.account_size)?,
        risk_percent: required_number("riskPercent", &request.risk_percent)?,
    })
}

/// Names of required fields that are absent or falsy.
pub fn missing_fields(request: &RiskRequest) -> Vec<&'static str> {
    let values = [
        &request.exchange,
        &request.symbol,
        &request.direction,
        &request.entry_price,
        &request.account_size,
        &request.risk_percent,
    ];

    REQUIRED_FIELDS
        .iter()
        .zip(values)
        .filter(|(_, value)| !is_present(value))
        .map(|(name, _)| *name)
        .collect()
}

fn is_present(value: &Option<Value>) -> bool {
    value.as_ref().is_some_and(|v| !is_falsy(v))
}

fn required_text(field: &'static str, value: &Option<Value>) -> Result<String, CalculationError> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(CalculationError::InvalidText { field }),
    }
}

fn required_number(
    field: &'static str,
    value: &Option<Value>,
) -> Result<Decimal, CalculationError> {
    match value {
        Some(v) => parse_decimal(field, v),
        None => Err(CalculationError::MissingRequiredFields { fields: vec![field] }),
    }
}

fn optional_number(
    field: &'static str,
    value: &Option<Value>,
) -> Result<Option<Decimal>, CalculationError> {
    match value {
        Some(v) if !is_falsy(v) => parse_decimal(field, v).map(Some),
        _ => Ok(None),
    }
}
