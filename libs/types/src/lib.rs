//! Types library for the risk calculator service
//!
//! Core type definitions shared by the calculator, the market data providers
//! and the HTTP gateway.
//!
//! # Modules
//! - `ids`: Unique identifiers (UserId, TradeId)
//! - `numeric`: Decimal parsing, falsy checks, output rounding
//! - `risk`: Calculation request, validated parameters and result
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod risk;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::risk::*;
}
