//! Ledger entry repository.
//!
//! Entries are append-only: there is no update method, and the only
//! delete is the customer-cascade cleanup.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use stanza_core::ledger::EntryKind;
use stanza_shared::types::LedgerEntryId;

use crate::entities::ledger_entries;

/// Input for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// Customer whose balance the entry affects.
    pub customer_id: Uuid,
    /// Signed kind; the amount itself stays a magnitude.
    pub kind: EntryKind,
    /// Non-negative magnitude.
    pub amount: Decimal,
    /// Free-text description.
    pub description: Option<String>,
    /// Originating reservation, if any.
    pub reservation_id: Option<Uuid>,
    /// Originating payment, if any.
    pub payment_id: Option<Uuid>,
}

/// Repository for ledger entry queries and appends.
#[derive(Debug, Clone)]
pub struct LedgerEntryRepository {
    db: DatabaseConnection,
}

impl LedgerEntryRepository {
    /// Creates a new ledger entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a customer's full ledger, oldest first.
    pub async fn for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<ledger_entries::Model>, DbErr> {
        ledger_entries::Entity::find()
            .filter(ledger_entries::Column::CustomerId.eq(customer_id))
            .order_by_asc(ledger_entries::Column::EntryDate)
            .all(&self.db)
            .await
    }

    /// Lists a customer's most recent entries, newest first.
    pub async fn recent_for_customer(
        &self,
        customer_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ledger_entries::Model>, DbErr> {
        ledger_entries::Entity::find()
            .filter(ledger_entries::Column::CustomerId.eq(customer_id))
            .order_by_desc(ledger_entries::Column::EntryDate)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// Lists the whole ledger (overdue classification folds it per
    /// customer).
    pub async fn all(&self) -> Result<Vec<ledger_entries::Model>, DbErr> {
        ledger_entries::Entity::find().all(&self.db).await
    }

    /// Appends one immutable entry.
    pub async fn insert(
        &self,
        txn: &DatabaseTransaction,
        new: NewLedgerEntry,
    ) -> Result<ledger_entries::Model, DbErr> {
        let entry = ledger_entries::ActiveModel {
            id: Set(LedgerEntryId::new().into_inner()),
            customer_id: Set(new.customer_id),
            entry_kind: Set(new.kind.into()),
            amount: Set(new.amount),
            entry_date: Set(Utc::now().into()),
            description: Set(new.description),
            reservation_id: Set(new.reservation_id),
            payment_id: Set(new.payment_id),
        };

        entry.insert(txn).await
    }

    /// Removes all of a customer's entries (customer-cascade delete only).
    pub async fn delete_for_customer(
        &self,
        txn: &DatabaseTransaction,
        customer_id: Uuid,
    ) -> Result<u64, DbErr> {
        let result = ledger_entries::Entity::delete_many()
            .filter(ledger_entries::Column::CustomerId.eq(customer_id))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Projects stored entries into the `(kind, amount)` pairs the balance
/// fold consumes.
#[must_use]
pub fn signed_inputs(entries: &[ledger_entries::Model]) -> Vec<(EntryKind, Decimal)> {
    entries
        .iter()
        .map(|e| (e.entry_kind.clone().into(), e.amount))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums;
    use rust_decimal_macros::dec;
    use stanza_core::ledger::compute_balance;

    fn entry(kind: sea_orm_active_enums::EntryKind, amount: Decimal) -> ledger_entries::Model {
        ledger_entries::Model {
            id: Uuid::now_v7(),
            customer_id: Uuid::now_v7(),
            entry_kind: kind,
            amount,
            entry_date: Utc::now().into(),
            description: None,
            reservation_id: None,
            payment_id: None,
        }
    }

    #[test]
    fn test_signed_inputs_feed_the_fold() {
        let entries = vec![
            entry(sea_orm_active_enums::EntryKind::Debt, dec!(300)),
            entry(sea_orm_active_enums::EntryKind::Payment, dec!(120)),
            entry(sea_orm_active_enums::EntryKind::Refund, dec!(30)),
        ];
        assert_eq!(compute_balance(signed_inputs(&entries)), dec!(150));
    }
}
