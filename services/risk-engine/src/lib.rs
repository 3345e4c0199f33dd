//! Risk Engine
//!
//! Position sizing and risk/reward evaluation for a single trade idea:
//! input validation, the calculation itself, and aggregate statistics over
//! saved calculations.

pub mod validator;
pub mod sizing;
pub mod stats;
pub mod engine;

pub use engine::RiskEngine;
pub use stats::{summarize, PortfolioSummary};
