//! Payment repository.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use stanza_shared::types::PaymentId;

use crate::entities::{payments, reservations};

/// Input for inserting a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Reservation being paid for.
    pub reservation_id: Uuid,
    /// Positive payment amount.
    pub amount: Decimal,
    /// Payment method reference.
    pub payment_method_id: i32,
    /// Whether the payment has been settled.
    pub is_paid: bool,
}

/// Replacement field set for updating a payment; the payment date is
/// preserved from the stored row.
#[derive(Debug, Clone)]
pub struct PaymentChanges {
    /// Reservation being paid for.
    pub reservation_id: Uuid,
    /// Positive payment amount.
    pub amount: Decimal,
    /// Payment method reference.
    pub payment_method_id: i32,
    /// Whether the payment has been settled.
    pub is_paid: bool,
}

/// Repository for payment queries and writes.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a payment by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<payments::Model>, DbErr> {
        payments::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all payments, newest first.
    pub async fn list_all(&self) -> Result<Vec<payments::Model>, DbErr> {
        payments::Entity::find()
            .order_by_desc(payments::Column::PaymentDate)
            .all(&self.db)
            .await
    }

    /// Lists payments not yet settled.
    pub async fn list_pending(&self) -> Result<Vec<payments::Model>, DbErr> {
        payments::Entity::find()
            .filter(payments::Column::IsPaid.eq(false))
            .order_by_desc(payments::Column::PaymentDate)
            .all(&self.db)
            .await
    }

    /// Lists a customer's settled payments (joined through their
    /// reservations).
    pub async fn paid_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<payments::Model>, DbErr> {
        payments::Entity::find()
            .inner_join(reservations::Entity)
            .filter(reservations::Column::CustomerId.eq(customer_id))
            .filter(payments::Column::IsPaid.eq(true))
            .all(&self.db)
            .await
    }

    /// Inserts a new payment.
    pub async fn insert(
        &self,
        txn: &DatabaseTransaction,
        new: NewPayment,
    ) -> Result<payments::Model, DbErr> {
        let payment = payments::ActiveModel {
            id: Set(PaymentId::new().into_inner()),
            reservation_id: Set(new.reservation_id),
            amount: Set(new.amount),
            payment_date: Set(Utc::now().into()),
            payment_method_id: Set(new.payment_method_id),
            is_paid: Set(new.is_paid),
        };

        payment.insert(txn).await
    }

    /// Updates a payment, preserving the original payment date.
    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        existing: &payments::Model,
        changes: PaymentChanges,
    ) -> Result<payments::Model, DbErr> {
        let payment = payments::ActiveModel {
            id: Set(existing.id),
            reservation_id: Set(changes.reservation_id),
            amount: Set(changes.amount),
            payment_date: Set(existing.payment_date),
            payment_method_id: Set(changes.payment_method_id),
            is_paid: Set(changes.is_paid),
        };

        payment.update(conn).await
    }

    /// Deletes a payment, returning the number of removed rows.
    ///
    /// Any ledger entry the payment produced stays behind (entries are
    /// immutable); the store nulls its provenance link.
    pub async fn delete(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
    ) -> Result<u64, DbErr> {
        let result = payments::Entity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected)
    }
}
