//! Deletion guard rules.
//!
//! A customer can only be removed once nothing refers to them financially
//! or operationally: no active reservations, and a ledger that folds to
//! exactly zero. A room only needs the reservation check.

use rust_decimal::Decimal;

use super::error::BookingError;

/// Checks the preconditions for deleting a customer.
///
/// `active_reservations` is the number of active reservations referencing
/// the customer; `balance` is the freshly folded ledger balance.
pub fn check_customer_deletable(
    active_reservations: usize,
    balance: Decimal,
) -> Result<(), BookingError> {
    if active_reservations > 0 {
        return Err(BookingError::CustomerHasActiveReservations);
    }
    if balance != Decimal::ZERO {
        return Err(BookingError::CustomerBalanceNotZero(balance));
    }
    Ok(())
}

/// Checks the preconditions for deleting a room.
pub fn check_room_deletable(active_reservations: usize) -> Result<(), BookingError> {
    if active_reservations > 0 {
        return Err(BookingError::RoomHasActiveReservations);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_active_reservation_blocks_customer_delete() {
        assert_eq!(
            check_customer_deletable(1, dec!(0)),
            Err(BookingError::CustomerHasActiveReservations)
        );
    }

    #[test]
    fn test_nonzero_balance_blocks_customer_delete() {
        assert_eq!(
            check_customer_deletable(0, dec!(250)),
            Err(BookingError::CustomerBalanceNotZero(dec!(250)))
        );
        // A credit balance blocks deletion just like outstanding debt.
        assert_eq!(
            check_customer_deletable(0, dec!(-10)),
            Err(BookingError::CustomerBalanceNotZero(dec!(-10)))
        );
    }

    #[test]
    fn test_settled_customer_is_deletable() {
        assert_eq!(check_customer_deletable(0, dec!(0)), Ok(()));
    }

    #[test]
    fn test_active_reservation_checked_before_balance() {
        // Both preconditions fail; the reservation guard reports first.
        assert_eq!(
            check_customer_deletable(2, dec!(99)),
            Err(BookingError::CustomerHasActiveReservations)
        );
    }

    #[test]
    fn test_room_guard() {
        assert_eq!(check_room_deletable(0), Ok(()));
        assert_eq!(
            check_room_deletable(3),
            Err(BookingError::RoomHasActiveReservations)
        );
    }
}
