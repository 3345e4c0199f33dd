//! The price provider seam

use async_trait::async_trait;
use thiserror::Error;

use crate::quote::Quote;

/// Errors from any price source.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Unknown exchange: {exchange}")]
    UnknownExchange { exchange: String },

    #[error("Unknown symbol {symbol} on {exchange}")]
    UnknownSymbol { exchange: String, symbol: String },

    #[error("Upstream price feed error: {0}")]
    Upstream(String),

    #[error("Invalid quote seed: {0}")]
    InvalidSeed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarketDataError {
    /// True for lookups of things that do not exist (maps to HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MarketDataError::UnknownExchange { .. } | MarketDataError::UnknownSymbol { .. }
        )
    }
}

/// Capability: fetch current prices for (exchange, symbol).
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Current quote for one instrument.
    async fn quote(&self, exchange: &str, symbol: &str) -> Result<Quote, MarketDataError>;

    /// All quotes on an exchange, sorted by symbol.
    async fn quotes(&self, exchange: &str) -> Result<Vec<Quote>, MarketDataError>;

    /// Symbols listed on an exchange, sorted.
    async fn symbols(&self, exchange: &str) -> Result<Vec<String>, MarketDataError>;

    /// Known exchanges, sorted.
    async fn exchanges(&self) -> Result<Vec<String>, MarketDataError>;
}
