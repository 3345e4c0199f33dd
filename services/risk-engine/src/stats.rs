//! Portfolio statistics over saved calculations
//!
//! Aggregates a user's saved trades into the figures shown on the dashboard.
//! Sums saturate instead of panicking; inputs come from already validated
//! calculations so this only matters for absurd magnitudes.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use types::numeric::serialize_money;
use types::risk::{Direction, RiskCalculation};

/// Dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_trades: usize,
    pub long_trades: usize,
    pub short_trades: usize,
    #[serde(serialize_with = "serialize_money")]
    pub total_risk_amount: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_reward_amount: Decimal,
    /// Mean over trades that have a non-zero ratio.
    #[serde(serialize_with = "serialize_money")]
    pub average_risk_reward: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub best_risk_reward: Decimal,
    /// Distinct exchanges, sorted.
    pub exchanges: Vec<String>,
}

/// `Σ calculation.risk_amount`
pub fn total_risk(calculations: &[RiskCalculation]) -> Decimal {
    calculations
        .iter()
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.risk_amount))
}

/// `Σ calculation.reward_amount`
pub fn total_reward(calculations: &[RiskCalculation]) -> Decimal {
    calculations
        .iter()
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.reward_amount))
}

/// Mean risk/reward ratio, skipping trades without one (no stop or target).
pub fn average_risk_reward(calculations: &[RiskCalculation]) -> Decimal {
    let ratios: Vec<Decimal> = calculations
        .iter()
        .map(|c| c.risk_reward_ratio)
        .filter(|r| !r.is_zero())
        .collect();

    if ratios.is_empty() {
        return Decimal::ZERO;
    }

    let sum = ratios
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(*r));
    sum.checked_div(Decimal::from(ratios.len()))
        .unwrap_or(Decimal::ZERO)
}

/// Build the full summary.
pub fn summarize(calculations: &[RiskCalculation]) -> PortfolioSummary {
    let count = |direction: Direction| {
        calculations
            .iter()
            .filter(|c| c.direction_kind() == Some(direction))
            .count()
    };

    let exchanges: BTreeSet<String> = calculations
        .iter()
        .map(|c| c.exchange.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    PortfolioSummary {
        total_trades: calculations.len(),
        long_trades: count(Direction::Long),
        short_trades: count(Direction::Short),
        total_risk_amount: total_risk(calculations),
        total_reward_amount: total_reward(calculations),
        average_risk_reward: average_risk_reward(calculations),
        best_risk_reward: calculations
            .iter()
            .map(|c| c.risk_reward_ratio)
            .max()
            .unwrap_or(Decimal::ZERO),
        exchanges: exchanges.into_iter().collect(),
    }
}
