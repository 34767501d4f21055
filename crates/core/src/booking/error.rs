//! Error types for booking decisions.

use rust_decimal::Decimal;
use thiserror::Error;

use stanza_shared::AppError;

/// Errors raised by booking validation and guard rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    /// Reservation interval is empty or inverted.
    #[error("Start date must be before end date")]
    InvalidInterval,

    /// Price must not be negative.
    #[error("Price must not be negative")]
    NegativePrice,

    /// Customer full name is required.
    #[error("Full name is required")]
    MissingFullName,

    /// E-mail address is not syntactically valid.
    #[error("Invalid e-mail address: {0}")]
    InvalidEmail(String),

    /// The room is already booked for the requested interval.
    #[error("The room is already booked for the selected dates")]
    RoomAlreadyBooked,

    /// Customer still has active reservations.
    #[error("Cannot delete customer with active reservations")]
    CustomerHasActiveReservations,

    /// Customer balance is not settled.
    #[error("Cannot delete customer with a non-zero balance (balance: {0})")]
    CustomerBalanceNotZero(Decimal),

    /// Room still has active reservations.
    #[error("Cannot delete room with active reservations")]
    RoomHasActiveReservations,
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidInterval
            | BookingError::NegativePrice
            | BookingError::MissingFullName
            | BookingError::InvalidEmail(_) => Self::Validation(err.to_string()),
            BookingError::RoomAlreadyBooked
            | BookingError::CustomerHasActiveReservations
            | BookingError::CustomerBalanceNotZero(_)
            | BookingError::RoomHasActiveReservations => Self::Conflict(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validation_errors_map_to_400() {
        let err: AppError = BookingError::InvalidInterval.into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_guard_errors_map_to_conflict() {
        let err: AppError = BookingError::CustomerBalanceNotZero(dec!(120.50)).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "CONFLICT");
        assert!(err.to_string().contains("120.50"));
    }
}
