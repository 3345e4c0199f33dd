//! Risk calculation request and result types
//!
//! `RiskRequest` is the wire shape (loosely typed, every field optional),
//! `RiskParameters` is the validated input to the calculator and
//! `RiskCalculation` is the immutable result.

use crate::numeric::{serialize_float, serialize_float_opt, serialize_money, serialize_position};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Trade direction.
///
/// The calculator itself never interprets direction (distances are absolute),
/// it is only used for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Case-insensitive match of the free-text direction field.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "LONG" | "BUY" => Some(Direction::Long),
            "SHORT" | "SELL" => Some(Direction::Short),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Raw request body for `POST /api/calculate`.
///
/// Values stay as JSON so presence ("falsy") checks and numeric coercion can
/// be done by the validator with field-level errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskRequest {
    pub exchange: Option<Value>,
    pub symbol: Option<Value>,
    pub direction: Option<Value>,
    pub entry_price: Option<Value>,
    pub stop_loss: Option<Value>,
    pub target_price: Option<Value>,
    pub account_size: Option<Value>,
    pub risk_percent: Option<Value>,
}

/// Validated calculator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskParameters {
    pub exchange: String,
    pub symbol: String,
    pub direction: String,
    pub entry_price: Decimal,
    pub stop_loss: Option<Decimal>,
    pub target_price: Option<Decimal>,
    pub account_size: Decimal,
    pub risk_percent: Decimal,
}

/// Result of a risk calculation.
///
/// Holds full-precision values; rounding to 8 dp (position) and 2 dp (money,
/// ratio) happens only in `Serialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCalculation {
    pub exchange: String,
    pub symbol: String,
    pub direction: String,
    #[serde(serialize_with = "serialize_float")]
    pub entry_price: Decimal,
    #[serde(serialize_with = "serialize_float_opt")]
    pub stop_loss: Option<Decimal>,
    #[serde(serialize_with = "serialize_float_opt")]
    pub target_price: Option<Decimal>,
    #[serde(serialize_with = "serialize_float")]
    pub account_size: Decimal,
    #[serde(serialize_with = "serialize_float")]
    pub risk_percent: Decimal,
    #[serde(serialize_with = "serialize_position")]
    pub position_size: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub risk_amount: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub reward_amount: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub risk_reward_ratio: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl RiskCalculation {
    /// Parsed direction, if the free-text field is recognisable.
    pub fn direction_kind(&self) -> Option<Direction> {
        Direction::parse(&self.direction)
    }
}
