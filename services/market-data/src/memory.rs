//! In-memory quote table
//!
//! Single-instance price source. Quotes are pushed in with [`upsert`] or
//! loaded from a JSON array on startup.
//!
//! [`upsert`]: InMemoryPriceProvider::upsert

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::path::Path;

use crate::provider::{MarketDataError, PriceProvider};
use crate::quote::{normalize_exchange, normalize_symbol, Quote};

/// Quote table keyed by (exchange, symbol).
#[derive(Debug, Default)]
pub struct InMemoryPriceProvider {
    quotes: DashMap<(String, String), Quote>,
}

impl InMemoryPriceProvider {
    pub fn new() -> Self {
        Self {
            quotes: DashMap::new(),
        }
    }

    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let provider = Self::new();
        for quote in quotes {
            provider.upsert(quote);
        }
        provider
    }

    /// Parse a JSON array of quotes.
    pub fn from_json_str(json: &str) -> Result<Self, MarketDataError> {
        let quotes: Vec<Quote> =
            serde_json::from_str(json).map_err(|e| MarketDataError::InvalidSeed(e.to_string()))?;
        Ok(Self::from_quotes(quotes))
    }

    /// Load a JSON array of quotes from disk.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, MarketDataError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let provider = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), quotes = provider.len(), "Loaded quote seed");
        Ok(provider)
    }

    /// Insert or replace a quote.
    pub fn upsert(&self, mut quote: Quote) {
        let key = quote.key();
        quote.exchange = key.0.clone();
        quote.symbol = key.1.clone();
        self.quotes.insert(key, quote);
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    fn on_exchange(&self, exchange: &str) -> Result<Vec<Quote>, MarketDataError> {
        let exchange = normalize_exchange(exchange);
        let mut quotes: Vec<Quote> = self
            .quotes
            .iter()
            .filter(|entry| entry.key().0 == exchange)
            .map(|entry| entry.value().clone())
            .collect();

        if quotes.is_empty() {
            return Err(MarketDataError::UnknownExchange { exchange });
        }
        quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(quotes)
    }
}

#[async_trait]
impl PriceProvider for InMemoryPriceProvider {
    async fn quote(&self, exchange: &str, symbol: &str) -> Result<Quote, MarketDataError> {
        let key = (normalize_exchange(exchange), normalize_symbol(symbol));
        if let Some(quote) = self.quotes.get(&key) {
            return Ok(quote.clone());
        }

        // Distinguish an unknown exchange from an unknown symbol.
        self.on_exchange(exchange)?;
        Err(MarketDataError::UnknownSymbol {
            exchange: key.0,
            symbol: key.1,
        })
    }

    async fn quotes(&self, exchange: &str) -> Result<Vec<Quote>, MarketDataError> {
        self.on_exchange(exchange)
    }

    async fn symbols(&self, exchange: &str) -> Result<Vec<String>, MarketDataError> {
        Ok(self
            .on_exchange(exchange)?
            .into_iter()
            .map(|q| q.symbol)
            .collect())
    }

    async fn exchanges(&self) -> Result<Vec<String>, MarketDataError> {
        let exchanges: BTreeSet<String> = self.quotes.iter().map(|e| e.key().0.clone()).collect();
        Ok(exchanges.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;

    fn seeded() -> InMemoryPriceProvider {
        InMemoryPriceProvider::from_quotes([
            Quote::new("binance", "BTCUSDT", Decimal::from(65_000)),
            Quote::new("binance", "ETHUSDT", Decimal::from(3_100)),
            Quote::new("bybit", "SOLUSDT", Decimal::from(150)),
        ])
    }

    #[tokio::test]
    async fn test_quote_lookup_is_case_insensitive() {
        let provider = seeded();
        let q = provider.quote("Binance", "btcusdt").await.unwrap();
        assert_eq!(q.price, Decimal::from(65_000));
        assert_eq!(q.symbol, "BTCUSDT");
    }

    #[tokio::test]
    async fn test_unknown_exchange_vs_symbol() {
        let provider = seeded();
        let err = provider.quote("kraken", "BTCUSDT").await.unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownExchange { .. }));

        let err = provider.quote("binance", "DOGEUSDT").await.unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownSymbol { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_symbols_and_exchanges_sorted() {
        let provider = seeded();
        assert_eq!(
            provider.symbols("binance").await.unwrap(),
            vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]
        );
        assert_eq!(
            provider.exchanges().await.unwrap(),
            vec!["binance".to_string(), "bybit".to_string()]
        );
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let provider = seeded();
        provider.upsert(Quote::new("BINANCE", "btcusdt", Decimal::from(70_000)));
        assert_eq!(provider.len(), 3);
        let q = provider.quote("binance", "BTCUSDT").await.unwrap();
        assert_eq!(q.price, Decimal::from(70_000));
    }

    #[tokio::test]
    async fn test_load_json_seed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"exchange":"OKX","symbol":"btcusdt","price":"64990.1"}},
                {{"exchange":"okx","symbol":"ETHUSDT","price":3099.5,"change24h":2.1}}]"#
        )
        .unwrap();

        let provider = InMemoryPriceProvider::load_json(file.path()).await.unwrap();
        assert_eq!(provider.len(), 2);
        let q = provider.quote("okx", "BTCUSDT").await.unwrap();
        assert_eq!(q.price, Decimal::from_str_exact("64990.1").unwrap());
    }

    #[test]
    fn test_bad_seed_rejected() {
        let err = InMemoryPriceProvider::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidSeed(_)));
    }
}
