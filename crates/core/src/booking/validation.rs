//! Input validation for booking operations.
//!
//! These checks run before any transaction opens; a failure here is a 400,
//! never a rollback.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use validator::ValidateEmail;

use super::error::BookingError;

/// Validates that a reservation interval is non-empty.
pub fn validate_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), BookingError> {
    if start >= end {
        return Err(BookingError::InvalidInterval);
    }
    Ok(())
}

/// Validates that a reservation price is non-negative.
pub fn validate_price(price: Decimal) -> Result<(), BookingError> {
    if price < Decimal::ZERO {
        return Err(BookingError::NegativePrice);
    }
    Ok(())
}

/// Validates that a customer's full name is present.
pub fn validate_customer_name(full_name: &str) -> Result<(), BookingError> {
    if full_name.trim().is_empty() {
        return Err(BookingError::MissingFullName);
    }
    Ok(())
}

/// Validates e-mail syntax when an address is present.
pub fn validate_email(email: Option<&str>) -> Result<(), BookingError> {
    match email {
        Some(addr) if !addr.validate_email() => {
            Err(BookingError::InvalidEmail(addr.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_interval_must_be_nonempty() {
        assert_eq!(validate_interval(day(1), day(2)), Ok(()));
        assert_eq!(
            validate_interval(day(2), day(1)),
            Err(BookingError::InvalidInterval)
        );
        // Zero-length stays are rejected too.
        assert_eq!(
            validate_interval(day(1), day(1)),
            Err(BookingError::InvalidInterval)
        );
    }

    #[test]
    fn test_price_must_be_nonnegative() {
        assert_eq!(validate_price(dec!(0)), Ok(()));
        assert_eq!(validate_price(dec!(199.99)), Ok(()));
        assert_eq!(
            validate_price(dec!(-0.01)),
            Err(BookingError::NegativePrice)
        );
    }

    #[test]
    fn test_full_name_required() {
        assert_eq!(validate_customer_name("Ada Lovelace"), Ok(()));
        assert_eq!(
            validate_customer_name("   "),
            Err(BookingError::MissingFullName)
        );
        assert_eq!(
            validate_customer_name(""),
            Err(BookingError::MissingFullName)
        );
    }

    #[test]
    fn test_email_optional_but_checked() {
        assert_eq!(validate_email(None), Ok(()));
        assert_eq!(validate_email(Some("ada@example.com")), Ok(()));
        assert_eq!(
            validate_email(Some("not-an-address")),
            Err(BookingError::InvalidEmail("not-an-address".to_string()))
        );
    }
}
