//! Error types for ledger operations.

use thiserror::Error;

use stanza_shared::AppError;

/// Errors raised by ledger input validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Payment amounts must be strictly positive.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NonPositiveAmount => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_validation() {
        let err: AppError = LedgerError::NonPositiveAmount.into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Validation error: Amount must be greater than zero");
    }
}
