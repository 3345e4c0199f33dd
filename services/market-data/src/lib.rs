//! Market Data Service
//!
//! Answers "what is the current price of (exchange, symbol)?" behind the
//! [`PriceProvider`] trait so handlers never depend on where prices come
//! from.
//!
//! Implementations:
//! - [`InMemoryPriceProvider`]: concurrent quote table, seedable from JSON
//! - [`HttpPriceProvider`]: forwards lookups to an upstream price feed

pub mod quote;
pub mod provider;
pub mod memory;
pub mod http;

pub use http::HttpPriceProvider;
pub use memory::InMemoryPriceProvider;
pub use provider::{MarketDataError, PriceProvider};
pub use quote::Quote;
