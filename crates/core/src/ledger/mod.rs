//! Customer balance ledger logic.
//!
//! The ledger is an append-only sequence of signed entries per customer.
//! A balance is always *derived* by folding the full ledger at read time;
//! no running total is ever stored or trusted.

pub mod balance;
pub mod error;
pub mod types;

pub use balance::{balances_by_customer, compute_balance, is_overdue};
pub use error::LedgerError;
pub use types::{EntryKind, price_adjustment};
