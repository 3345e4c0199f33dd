//! Decimal parsing and output rounding
//!
//! Request values arrive as loosely-typed JSON (numbers or numeric strings).
//! They are parsed into `rust_decimal::Decimal` so no intermediate step can
//! produce NaN or Infinity. Rounding is applied only when a value is
//! serialized, never during computation.

use crate::errors::CalculationError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use std::str::FromStr;

/// Decimal places for position sizes (crypto lot precision).
pub const POSITION_DP: u32 = 8;

/// Decimal places for monetary amounts and ratios.
pub const MONEY_DP: u32 = 2;

/// Whether a JSON value counts as "not provided".
///
/// Mirrors the legacy client contract: `null`, `false`, the empty string and
/// numeric zero are all treated as missing. A string `"0"` is *not* falsy.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Parse a JSON number or numeric string into a `Decimal`.
pub fn parse_decimal(field: &'static str, value: &Value) -> Result<Decimal, CalculationError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(CalculationError::InvalidNumber { field }),
    };

    decimal_from_text(&text).ok_or(CalculationError::InvalidNumber { field })
}

/// Parse plain or scientific notation (`"1e3"`, which serde_json emits for
/// large floats).
fn decimal_from_text(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Round a position size for display.
pub fn round_position(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(POSITION_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a monetary amount or ratio for display.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Go through the decimal's text form so the emitted float is the nearest
/// `f64` to the printed digits.
fn emit_f64<S: Serializer>(value: Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    let float: f64 = value
        .normalize()
        .to_string()
        .parse()
        .map_err(|e| {
            serde::ser::Error::custom(format!("decimal {value} not representable as f64: {e}"))
        })?;
    serializer.serialize_f64(float)
}

/// Serialize as a JSON float rounded to [`POSITION_DP`].
pub fn serialize_position<S: Serializer>(
    value: &Decimal,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    emit_f64(round_position(*value), serializer)
}

/// Serialize as a JSON float rounded to [`MONEY_DP`].
pub fn serialize_money<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    emit_f64(round_money(*value), serializer)
}

/// Serialize as an unrounded JSON float.
pub fn serialize_float<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    emit_f64(*value, serializer)
}

/// Serialize an optional decimal as a float or `null`.
pub fn serialize_float_opt<S: Serializer>(
    value: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => emit_f64(*v, serializer),
        None => serializer.serialize_none(),
    }
}

/// Deserialize a decimal from either a JSON number or a numeric string.
pub fn deserialize_loose<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Decimal, D::Error> {
    let value = Value::deserialize(deserializer)?;
    parse_decimal("value", &value).map_err(serde::de::Error::custom)
}

/// Optional variant of [`deserialize_loose`]; `null` and missing map to `None`.
pub fn deserialize_loose_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_decimal("value", &v)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn any_decimal() -> impl Strategy<Value = Decimal> {
        (any::<i64>(), 0u32..=20).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
    }

    proptest! {
        #[test]
        fn prop_parse_accepts_printed_form(value in any_decimal()) {
            let text = value.to_string();
            prop_assert_eq!(parse_decimal("entryPrice", &json!(text)).unwrap(), value);
            let padded = format!("  {}\t", text);
            prop_assert_eq!(parse_decimal("entryPrice", &json!(padded)).unwrap(), value);
        }

        #[test]
        fn prop_position_rounding_is_idempotent(value in any_decimal()) {
            let once = round_position(value);
            prop_assert!(once.scale() <= POSITION_DP);
            prop_assert_eq!(round_position(once), once);
            prop_assert!((once - value).abs() <= Decimal::new(5, POSITION_DP + 1));
        }

        #[test]
        fn prop_money_rounding_is_idempotent(value in any_decimal()) {
            let once = round_money(value);
            prop_assert!(once.scale() <= MONEY_DP);
            prop_assert_eq!(round_money(once), once);
            prop_assert!((once - value).abs() <= Decimal::new(5, MONEY_DP + 1));
        }
    }
}
