//! Ledger domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of a ledger entry. The stored amount is always a non-negative
/// magnitude; the kind alone decides the sign during aggregation.
///
/// - `Debt` - amount owed by the customer (increases the balance)
/// - `Payment` - payment made by the customer (decreases the balance)
/// - `Refund` - repayment to the customer (decreases the balance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Amount owed by the customer.
    Debt,
    /// Payment made by the customer.
    Payment,
    /// Repayment to the customer.
    Refund,
}

impl EntryKind {
    /// Applies this kind's sign to a stored magnitude.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Debt => amount,
            Self::Payment | Self::Refund => -amount,
        }
    }
}

/// Derives the compensating ledger entry for a price change.
///
/// Returns `None` when the price is unchanged (no entry is written), a
/// `Debt` for the difference when the price rose, and a `Refund` of the
/// same magnitude when it fell.
#[must_use]
pub fn price_adjustment(old_price: Decimal, new_price: Decimal) -> Option<(EntryKind, Decimal)> {
    if new_price == old_price {
        return None;
    }
    if new_price > old_price {
        Some((EntryKind::Debt, new_price - old_price))
    } else {
        Some((EntryKind::Refund, old_price - new_price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_amounts() {
        assert_eq!(EntryKind::Debt.signed(dec!(100)), dec!(100));
        assert_eq!(EntryKind::Payment.signed(dec!(100)), dec!(-100));
        assert_eq!(EntryKind::Refund.signed(dec!(100)), dec!(-100));
    }

    #[test]
    fn test_price_adjustment_unchanged_is_none() {
        assert_eq!(price_adjustment(dec!(150), dec!(150)), None);
        assert_eq!(price_adjustment(dec!(0), dec!(0)), None);
    }

    #[test]
    fn test_price_raised_becomes_debt() {
        assert_eq!(
            price_adjustment(dec!(100), dec!(130)),
            Some((EntryKind::Debt, dec!(30)))
        );
    }

    #[test]
    fn test_price_lowered_becomes_refund() {
        assert_eq!(
            price_adjustment(dec!(130), dec!(100)),
            Some((EntryKind::Refund, dec!(30)))
        );
    }

    #[test]
    fn test_adjustment_magnitude_is_never_negative() {
        let (_, amount) = price_adjustment(dec!(500), dec!(0.01)).unwrap();
        assert!(amount > dec!(0));
    }
}
