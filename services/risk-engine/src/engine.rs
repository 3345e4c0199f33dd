//! Risk Engine orchestrator
//!
//! Ties together validation and sizing: raw request in, immutable
//! calculation out. Holds no state between calls.

use chrono::{DateTime, Utc};
use types::errors::CalculationError;
use types::risk::{RiskCalculation, RiskRequest};

use crate::sizing;
use crate::validator;

/// Stateless risk calculator service.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskEngine;

impl RiskEngine {
    pub fn new() -> Self {
        Self
    }

    /// Validate then calculate, stamping the result with the current time.
    pub fn evaluate(&self, request: &RiskRequest) -> Result<RiskCalculation, CalculationError> {
        self.evaluate_at(request, Utc::now())
    }

    /// Same as [`evaluate`](Self::evaluate) with an explicit timestamp, so
    /// the result is a pure function of its inputs.
    pub fn evaluate_at(
        &self,
        request: &RiskRequest,
        timestamp: DateTime<Utc>,
    ) -> Result<RiskCalculation, CalculationError> {
        let params = validator::validate_request(request)?;
        sizing::calculate(&params, timestamp)
    }
}
