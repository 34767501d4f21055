//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Validation and not-found errors are always detected before a unit of
/// work opens; conflict and persistence errors raised after `begin` roll
/// the open transaction back before they surface. Nothing here is retried.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input (missing required field, non-positive amount,
    /// start on or after end).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced customer, room, reservation, or payment is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business-rule rejection (overlapping interval, duplicate unique
    /// field, deletion blocked by active reservations or balance).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying store read/write failure.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Unit-of-work state violation or a failed rollback. Indicates a
    /// programming error in the orchestration, not bad user input.
    #[error("Fatal transaction error: {0}")]
    FatalTransaction(String),
}

impl AppError {
    /// Returns the status code for this error.
    ///
    /// Conventions: 400 validation/business-rule, 404 missing referent,
    /// 500 persistence or transaction-state failure.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Conflict(_) => 400,
            Self::NotFound(_) => 404,
            Self::Persistence(_) | Self::FatalTransaction(_) => 500,
        }
    }

    /// Returns the stable error code for service responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::FatalTransaction(_) => "FATAL_TRANSACTION_ERROR",
        }
    }
}
