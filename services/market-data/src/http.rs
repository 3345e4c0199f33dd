//! Upstream HTTP price feed
//!
//! Forwards lookups to an internal price service:
//!
//! ```text
//! GET {base}/exchanges                              -> ["binance", ...]
//! GET {base}/exchanges/{exchange}/quotes            -> [Quote, ...]
//! GET {base}/exchanges/{exchange}/quotes/{symbol}   -> Quote
//! GET {base}/exchanges/{exchange}/symbols           -> ["BTCUSDT", ...]
//! ```
//!
//! Caller-supplied exchange and symbol values are appended as single,
//! percent-encoded path segments, so they can never address another
//! upstream route. A 404 from upstream maps to the matching "unknown"
//! error, anything else non-2xx to `Upstream`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::provider::{MarketDataError, PriceProvider};
use crate::quote::{normalize_exchange, normalize_symbol, Quote};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Price provider backed by an HTTP service.
#[derive(Debug, Clone)]
pub struct HttpPriceProvider {
    client: Client,
    base_url: Url,
}

impl HttpPriceProvider {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, MarketDataError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self, MarketDataError> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| MarketDataError::Upstream(format!("invalid base url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(MarketDataError::Upstream(format!(
                "invalid base url: {} cannot carry a path",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketDataError::Upstream(format!("client build failed: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Base URL with `segments` appended, each percent-encoded on its own.
    ///
    /// `None` when a segment is empty, `.` or `..`: the URL path parser
    /// would drop those, and no upstream resource has such a name.
    fn endpoint(&self, segments: &[&str]) -> Option<Url> {
        if segments.iter().any(|s| matches!(*s, "" | "." | "..")) {
            return None;
        }
        let mut url = self.base_url.clone();
        // Cannot fail: the constructor rejects cannot-be-a-base URLs.
        url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
        Some(url)
    }

    /// GET a JSON body; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Option<T>, MarketDataError> {
        let Some(url) = self.endpoint(segments) else {
            tracing::debug!(?segments, "Refusing path segment that cannot name a resource");
            return Ok(None);
        };
        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MarketDataError::Upstream(format!("GET {} failed: {}", url, e)))?;

        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => res
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| {
                    MarketDataError::Upstream(format!("invalid body from {}: {}", url, e))
                }),
            status => {
                tracing::warn!(%url, %status, "Price feed returned error status");
                Err(MarketDataError::Upstream(format!("{} returned {}", url, status)))
            }
        }
    }
}

#[async_trait]
impl PriceProvider for HttpPriceProvider {
    async fn quote(&self, exchange: &str, symbol: &str) -> Result<Quote, MarketDataError> {
        let exchange = normalize_exchange(exchange);
        let symbol = normalize_symbol(symbol);
        self.get_json(&["exchanges", &exchange, "quotes", &symbol])
            .await?
            .ok_or(MarketDataError::UnknownSymbol { exchange, symbol })
    }

    async fn quotes(&self, exchange: &str) -> Result<Vec<Quote>, MarketDataError> {
        let exchange = normalize_exchange(exchange);
        let mut quotes: Vec<Quote> = self
            .get_json(&["exchanges", &exchange, "quotes"])
            .await?
            .ok_or(MarketDataError::UnknownExchange { exchange })?;
        quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(quotes)
    }

    async fn symbols(&self, exchange: &str) -> Result<Vec<String>, MarketDataError> {
        let exchange = normalize_exchange(exchange);
        let mut symbols: Vec<String> = self
            .get_json(&["exchanges", &exchange, "symbols"])
            .await?
            .ok_or(MarketDataError::UnknownExchange { exchange })?;
        symbols.sort();
        Ok(symbols)
    }

    async fn exchanges(&self) -> Result<Vec<String>, MarketDataError> {
        let mut exchanges: Vec<String> = self.get_json(&["exchanges"]).await?.unwrap_or_default();
        exchanges.sort();
        Ok(exchanges)
    }
}
