//! Balance aggregation over ledger entries.

use std::collections::HashMap;

use rust_decimal::Decimal;

use stanza_shared::types::CustomerId;

use super::types::EntryKind;

/// Folds a customer's ledger into their current balance.
///
/// The fold is a plain sum of signed amounts and therefore independent of
/// entry order. It must be recomputed from the full ledger on every query;
/// a stored running total can drift under partial-failure writes.
#[must_use]
pub fn compute_balance<I>(entries: I) -> Decimal
where
    I: IntoIterator<Item = (EntryKind, Decimal)>,
{
    entries
        .into_iter()
        .map(|(kind, amount)| kind.signed(amount))
        .sum()
}

/// Folds a whole ledger into per-customer balances.
#[must_use]
pub fn balances_by_customer<I>(entries: I) -> HashMap<CustomerId, Decimal>
where
    I: IntoIterator<Item = (CustomerId, EntryKind, Decimal)>,
{
    let mut balances: HashMap<CustomerId, Decimal> = HashMap::new();
    for (customer_id, kind, amount) in entries {
        *balances.entry(customer_id).or_default() += kind.signed(amount);
    }
    balances
}

/// A customer is overdue when their derived balance is strictly positive.
#[must_use]
pub fn is_overdue(balance: Decimal) -> bool {
    balance > Decimal::ZERO
}
