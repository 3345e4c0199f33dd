//! Storage seams for gateway state
//!
//! Handlers only see the traits; the in-memory implementations back a
//! single-instance deployment and the tests.

pub mod trades;
pub mod users;

use thiserror::Error;

pub use trades::{InMemoryTradeStore, TradeRecord, TradeStore};
pub use users::{InMemoryUserStore, User, UserStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}
