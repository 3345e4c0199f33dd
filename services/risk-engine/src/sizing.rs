//! Position sizing and risk/reward calculations
//!
//! Pure, deterministic decimal arithmetic. Every operation is checked so an
//! overflow surfaces as `CalculationError::Overflow` instead of a panic.
//! Nothing here rounds; rounding is a serialization concern.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use types::errors::CalculationError;
use types::risk::{RiskCalculation, RiskParameters};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Capital at risk on the trade.
///
/// `risk_amount = account_size × risk_percent / 100`
pub fn risk_amount(
    account_size: Decimal,
    risk_percent: Decimal,
) -> Result<Decimal, CalculationError> {
    account_size
        .checked_mul(risk_percent)
        .and_then(|v| v.checked_div(HUNDRED))
        .ok_or(CalculationError::Overflow { operation: "risk_amount" })
}

/// Absolute distance between two prices.
pub fn price_distance(a: Decimal, b: Decimal) -> Result<Decimal, CalculationError> {
    a.checked_sub(b)
        .map(|d| d.abs())
        .ok_or(CalculationError::Overflow { operation: "price_distance" })
}

/// Quantity that loses exactly `risk_amount` if the stop is hit.
///
/// Returns `None` for a zero stop distance (entry == stop) rather than
/// dividing by zero.
pub fn position_size(
    risk_amount: Decimal,
    stop_distance: Decimal,
) -> Result<Option<Decimal>, CalculationError> {
    if stop_distance <= Decimal::ZERO {
        return Ok(None);
    }
    risk_amount
        .checked_div(stop_distance)
        .map(Some)
        .ok_or(CalculationError::Overflow { operation: "position_size" })
}

/// Profit if the target is reached.
///
/// `reward_amount = position_size × target_distance`
pub fn reward_amount(
    position_size: Decimal,
    target_distance: Decimal,
) -> Result<Decimal, CalculationError> {
    position_size
        .checked_mul(target_distance)
        .ok_or(CalculationError::Overflow { operation: "reward_amount" })
}

/// Reward per unit of risk; zero when nothing is at risk.
pub fn risk_reward_ratio(
    reward_amount: Decimal,
    risk_amount: Decimal,
) -> Result<Decimal, CalculationError> {
    if risk_amount.is_zero() {
        return Ok(Decimal::ZERO);
    }
    reward_amount
        .checked_div(risk_amount)
        .ok_or(CalculationError::Overflow { operation: "risk_reward_ratio" })
}

/// Run the full calculation for validated parameters.
///
/// Outputs whose prerequisites are missing stay at zero:
/// - no stop loss (or stop == entry) ⇒ position size, reward and ratio are 0
/// - no target ⇒ reward and ratio are 0
pub fn calculate(
    params: &RiskParameters,
    timestamp: DateTime<Utc>,
) -> Result<RiskCalculation, CalculationError> {
    let risk = risk_amount(params.account_size, params.risk_percent)?;

    let size = match params.stop_loss {
        Some(stop) => position_size(risk, price_distance(params.entry_price, stop)?)?,
        None => None,
    };

    let (reward, ratio) = match (size, params.target_price) {
        (Some(size), Some(target)) => {
            let reward = reward_amount(size, price_distance(target, params.entry_price)?)?;
            (reward, risk_reward_ratio(reward, risk)?)
        }
        _ => (Decimal::ZERO, Decimal::ZERO),
    };

    Ok(RiskCalculation {
        exchange: params.exchange.clone(),
        symbol: params.symbol.clone(),
        direction: params.direction.clone(),
        entry_price: params.entry_price,
        stop_loss: params.stop_loss,
        target_price: params.target_price,
        account_size: params.account_size,
        risk_percent: params.risk_percent,
        position_size: size.unwrap_or(Decimal::ZERO),
        risk_amount: risk,
        reward_amount: reward,
        risk_reward_ratio: ratio,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use types::numeric::round_position;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn params(
        entry: &str,
        stop: Option<&str>,
        target: Option<&str>,
        account: &str,
        risk_pct: &str,
    ) -> RiskParameters {
        RiskParameters {
            exchange: "binance".into(),
            symbol: "BTCUSDT".into(),
            direction: "LONG".into(),
            entry_price: d(entry),
            stop_loss: stop.map(d),
            target_price: target.map(d),
            account_size: d(account),
            risk_percent: d(risk_pct),
        }
    }

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_708_123_456, 0).unwrap()
    }

    #[test]
    fn test_reference_long_trade() {
        // risk 200, stop distance 10 → size 20, reward 20 × 20 = 400, R:R 2
        let calc = calculate(&params("100", Some("90"), Some("120"), "10000", "2"), ts()).unwrap();
        assert_eq!(calc.risk_amount, d("200"));
        assert_eq!(calc.position_size, d("20"));
        assert_eq!(calc.reward_amount, d("400"));
        assert_eq!(calc.risk_reward_ratio, d("2"));
    }

    #[test]
    fn test_short_trade_uses_absolute_distances() {
        let calc = calculate(&params("100", Some("110"), Some("70"), "10000", "1"), ts()).unwrap();
        assert_eq!(calc.risk_amount, d("100"));
        assert_eq!(calc.position_size, d("10"));
        assert_eq!(calc.reward_amount, d("300"));
        assert_eq!(calc.risk_reward_ratio, d("3"));
    }

    #[test]
    fn test_stop_equal_to_entry_yields_zero_size() {
        let calc = calculate(&params("100", Some("100"), Some("120"), "1000", "1"), ts()).unwrap();
        assert_eq!(calc.risk_amount, d("10"));
        assert_eq!(calc.position_size, Decimal::ZERO);
        assert_eq!(calc.reward_amount, Decimal::ZERO);
        assert_eq!(calc.risk_reward_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_missing_target_zeroes_reward() {
        let calc = calculate(&params("100", Some("90"), None, "10000", "2"), ts()).unwrap();
        assert_eq!(calc.position_size, d("20"));
        assert_eq!(calc.reward_amount, Decimal::ZERO);
        assert_eq!(calc.risk_reward_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_missing_stop_zeroes_everything_but_risk() {
        let calc = calculate(&params("100", None, Some("120"), "10000", "2"), ts()).unwrap();
        assert_eq!(calc.risk_amount, d("200"));
        assert_eq!(calc.position_size, Decimal::ZERO);
        assert_eq!(calc.reward_amount, Decimal::ZERO);
        assert_eq!(calc.risk_reward_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_zero_risk_percent() {
        let calc = calculate(&params("100", Some("90"), Some("120"), "10000", "0"), ts()).unwrap();
        assert_eq!(calc.risk_amount, Decimal::ZERO);
        assert_eq!(calc.position_size, Decimal::ZERO);
        assert_eq!(calc.risk_reward_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_zero_account_size() {
        let calc = calculate(&params("100", Some("95"), None, "0", "5"), ts()).unwrap();
        assert_eq!(calc.risk_amount, Decimal::ZERO);
        assert_eq!(calc.position_size, Decimal::ZERO);
    }

    #[test]
    fn test_fractional_sizes_keep_full_precision() {
        let calc = calculate(&params("100", Some("97"), None, "1000", "1"), ts()).unwrap();
        // 10 / 3, rounded only on output
        assert!(calc.position_size.scale() > 8);
        assert_eq!(round_position(calc.position_size), d("3.33333333"));
    }

    #[test]
    fn test_echoes_request_fields() {
        let p = params("100", Some("90"), None, "10000", "2");
        let calc = calculate(&p, ts()).unwrap();
        assert_eq!(calc.exchange, p.exchange);
        assert_eq!(calc.entry_price, p.entry_price);
        assert_eq!(calc.stop_loss, p.stop_loss);
        assert_eq!(calc.target_price, None);
        assert_eq!(calc.timestamp, ts());
    }

    #[test]
    fn test_overflow_is_reported() {
        let huge = Decimal::MAX.to_string();
        let err = calculate(&params("1", None, None, &huge, "1000"), ts()).unwrap_err();
        assert!(matches!(err, CalculationError::Overflow { .. }));
    }

    #[test]
    fn test_ratio_zero_when_nothing_at_risk() {
        assert_eq!(risk_reward_ratio(d("50"), Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_calculation_is_deterministic(
            entry in 1u64..1_000_000,
            stop in 1u64..1_000_000,
            target in 1u64..1_000_000,
            account in 1u64..10_000_000,
            risk_bp in 1u32..10_000,
        ) {
            let p = RiskParameters {
                exchange: "bybit".into(),
                symbol: "ETHUSDT".into(),
                direction: "SHORT".into(),
                entry_price: Decimal::from(entry),
                stop_loss: Some(Decimal::from(stop)),
                target_price: Some(Decimal::from(target)),
                account_size: Decimal::from(account),
                risk_percent: Decimal::new(risk_bp as i64, 2),
            };
            let a = calculate(&p, ts()).unwrap();
            let b = calculate(&p, ts()).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_stop_hit_loses_exactly_risk_amount(
            entry in 1u64..1_000_000,
            offset in 1u64..10_000,
            account in 1u64..10_000_000,
            risk_bp in 1u32..10_000,
        ) {
            let p = RiskParameters {
                exchange: "binance".into(),
                symbol: "BTCUSDT".into(),
                direction: "LONG".into(),
                entry_price: Decimal::from(entry + offset),
                stop_loss: Some(Decimal::from(entry)),
                target_price: None,
                account_size: Decimal::from(account),
                risk_percent: Decimal::new(risk_bp as i64, 2),
            };
            let calc = calculate(&p, ts()).unwrap();
            let loss = calc.position_size * Decimal::from(offset);
            prop_assert!((loss - calc.risk_amount).abs() < Decimal::new(1, 8));
        }

        #[test]
        fn prop_never_panics_on_zero_distance(
            price in 1u64..1_000_000,
            account in 0u64..10_000_000,
        ) {
            let p = RiskParameters {
                exchange: "okx".into(),
                symbol: "SOLUSDT".into(),
                direction: "LONG".into(),
                entry_price: Decimal::from(price),
                stop_loss: Some(Decimal::from(price)),
                target_price: Some(Decimal::from(price)),
                account_size: Decimal::from(account),
                risk_percent: Decimal::ONE,
            };
            let calc = calculate(&p, ts()).unwrap();
            prop_assert_eq!(calc.position_size, Decimal::ZERO);
            prop_assert_eq!(calc.risk_reward_ratio, Decimal::ZERO);
        }
    }
}
