//! Price quote type

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::numeric::{
    deserialize_loose, deserialize_loose_opt, serialize_float, serialize_float_opt,
};

/// Last known price for one instrument on one exchange.
///
/// Prices are accepted as JSON numbers or strings and emitted as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub exchange: String,
    pub symbol: String,
    #[serde(serialize_with = "serialize_float", deserialize_with = "deserialize_loose")]
    pub price: Decimal,
    /// 24h change in percent, when the source provides it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_float_opt",
        deserialize_with = "deserialize_loose_opt"
    )]
    pub change_24h: Option<Decimal>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(exchange: &str, symbol: &str, price: Decimal) -> Self {
        Self {
            exchange: normalize_exchange(exchange),
            symbol: normalize_symbol(symbol),
            price,
            change_24h: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_change(mut self, change_24h: Decimal) -> Self {
        self.change_24h = Some(change_24h);
        self
    }

    /// Canonical lookup key.
    pub fn key(&self) -> (String, String) {
        (normalize_exchange(&self.exchange), normalize_symbol(&self.symbol))
    }
}

/// Exchanges are matched case-insensitively (`Binance` == `binance`).
pub fn normalize_exchange(exchange: &str) -> String {
    exchange.trim().to_lowercase()
}

/// Symbols are matched case-insensitively and stored uppercase.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_normalizes() {
        let q = Quote::new(" Binance ", "btcusdt", Decimal::from(65_000));
        assert_eq!(q.exchange, "binance");
        assert_eq!(q.symbol, "BTCUSDT");
    }

    #[test]
    fn test_deserialize_string_or_number_price() {
        let a: Quote = serde_json::from_value(json!({
            "exchange": "binance", "symbol": "BTCUSDT", "price": "65000.5"
        }))
        .unwrap();
        let b: Quote = serde_json::from_value(json!({
            "exchange": "binance", "symbol": "BTCUSDT", "price": 65000.5, "change24h": -1.25
        }))
        .unwrap();

        assert_eq!(a.price, b.price);
        assert_eq!(a.change_24h, None);
        assert_eq!(b.change_24h, Some(Decimal::from_str_exact("-1.25").unwrap()));
    }

    #[test]
    fn test_serialize_price_as_number() {
        let q = Quote::new("bybit", "ETHUSDT", Decimal::from_str_exact("3100.25").unwrap());
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["price"], json!(3100.25));
        assert!(v.get("change24h").is_none());
    }
}
