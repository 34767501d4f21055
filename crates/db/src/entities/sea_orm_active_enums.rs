//! Database enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry kind as stored in the `entry_kind` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_kind")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Amount owed by the customer.
    #[sea_orm(string_value = "debt")]
    Debt,
    /// Payment made by the customer.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Repayment to the customer.
    #[sea_orm(string_value = "refund")]
    Refund,
}

impl From<EntryKind> for stanza_core::ledger::EntryKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Debt => Self::Debt,
            EntryKind::Payment => Self::Payment,
            EntryKind::Refund => Self::Refund,
        }
    }
}

impl From<stanza_core::ledger::EntryKind> for EntryKind {
    fn from(kind: stanza_core::ledger::EntryKind) -> Self {
        match kind {
            stanza_core::ledger::EntryKind::Debt => Self::Debt,
            stanza_core::ledger::EntryKind::Payment => Self::Payment,
            stanza_core::ledger::EntryKind::Refund => Self::Refund,
        }
    }
}
