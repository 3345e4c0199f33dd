//! Error types for the risk calculation path
//!
//! Display strings are the user-facing (Portuguese) messages returned by the
//! HTTP layer, so they must stay stable.

use thiserror::Error;

/// Everything that can go wrong between a raw request and a calculation.
///
/// All variants are caller errors (HTTP 400). Unexpected failures are not
/// represented here; the gateway wraps those separately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error("Campos obrigatórios não preenchidos")]
    MissingRequiredFields { fields: Vec<&'static str> },

    #[error("Valor numérico inválido para o campo {field}")]
    InvalidNumber { field: &'static str },

    #[error("Valor de texto inválido para o campo {field}")]
    InvalidText { field: &'static str },

    #[error("Valores numéricos fora do intervalo suportado")]
    Overflow { operation: &'static str },
}

impl CalculationError {
    /// Names of the fields involved, for logging.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            CalculationError::MissingRequiredFields { fields } => fields.clone(),
            CalculationError::InvalidNumber { field } | CalculationError::InvalidText { field } => {
                vec![*field]
            }
            CalculationError::Overflow { .. } => Vec::new(),
        }
    }
}
