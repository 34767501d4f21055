//! Payment service.
//!
//! A settled payment is a financial event: creating one with `is_paid`
//! appends a `Payment` ledger entry for the reservation's customer in the
//! same unit of work, so the payment row and the balance effect are never
//! visible apart.

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use stanza_core::ledger::{EntryKind, LedgerError};
use stanza_db::entities::payments;
use stanza_db::repositories::ledger::NewLedgerEntry;
use stanza_db::repositories::payment::{NewPayment, PaymentChanges};
use stanza_db::{LedgerEntryRepository, PaymentRepository, ReservationRepository, UnitOfWork};
use stanza_shared::{AppError, AppResult, ServiceResponse};

use crate::{persistence_error, rollback_then};

/// Input for creating a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Reservation being paid for.
    pub reservation_id: Uuid,
    /// Positive payment amount.
    pub amount: Decimal,
    /// Payment method reference.
    pub payment_method_id: i32,
    /// Whether the payment is already settled.
    pub is_paid: bool,
}

/// Input for updating a payment.
#[derive(Debug, Clone)]
pub struct UpdatePaymentInput {
    /// Payment to update.
    pub id: Uuid,
    /// Reservation being paid for.
    pub reservation_id: Uuid,
    /// Positive payment amount.
    pub amount: Decimal,
    /// Payment method reference.
    pub payment_method_id: i32,
    /// Whether the payment is settled.
    pub is_paid: bool,
}

/// Payment lifecycle.
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: DatabaseConnection,
    payments: PaymentRepository,
    reservations: ReservationRepository,
    ledger: LedgerEntryRepository,
}

impl PaymentService {
    /// Creates a payment service over the given connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            payments: PaymentRepository::new(db.clone()),
            reservations: ReservationRepository::new(db.clone()),
            ledger: LedgerEntryRepository::new(db.clone()),
            db,
        }
    }

    /// Returns a payment by id.
    pub async fn get_payment(&self, id: Uuid) -> ServiceResponse<payments::Model> {
        match self.try_get(id).await {
            Ok(model) => ServiceResponse::ok("Payment retrieved successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Lists all payments.
    pub async fn list_payments(&self) -> ServiceResponse<Vec<payments::Model>> {
        match self.payments.list_all().await {
            Ok(models) => ServiceResponse::ok("Payments retrieved successfully", models),
            Err(err) => {
                ServiceResponse::failure(&persistence_error("Failed to retrieve payments", &err))
            }
        }
    }

    /// Lists payments not yet settled.
    pub async fn list_pending_payments(&self) -> ServiceResponse<Vec<payments::Model>> {
        match self.payments.list_pending().await {
            Ok(models) => ServiceResponse::ok("Pending payments retrieved successfully", models),
            Err(err) => ServiceResponse::failure(&persistence_error(
                "Failed to retrieve pending payments",
                &err,
            )),
        }
    }

    /// Sums a customer's settled payments.
    pub async fn total_paid_by_customer(&self, customer_id: Uuid) -> ServiceResponse<Decimal> {
        match self.payments.paid_for_customer(customer_id).await {
            Ok(models) => {
                let total: Decimal = models.iter().map(|p| p.amount).sum();
                ServiceResponse::ok("Total payments retrieved successfully", total)
            }
            Err(err) => {
                ServiceResponse::failure(&persistence_error("Failed to retrieve payments", &err))
            }
        }
    }

    /// Creates a payment; a settled one also books its ledger effect.
    pub async fn create_payment(
        &self,
        input: CreatePaymentInput,
    ) -> ServiceResponse<payments::Model> {
        match self.try_create(input).await {
            Ok(model) => ServiceResponse::created("Payment created successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Updates a payment, preserving the original payment date. The
    /// ledger is append-only: flipping `is_paid` here writes no entry.
    pub async fn update_payment(
        &self,
        input: UpdatePaymentInput,
    ) -> ServiceResponse<payments::Model> {
        match self.try_update(input).await {
            Ok(model) => ServiceResponse::ok("Payment updated successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Deletes a payment. Its ledger entry, if one was written, stays.
    pub async fn delete_payment(&self, id: Uuid) -> ServiceResponse<bool> {
        match self.try_delete(id).await {
            Ok(()) => ServiceResponse::ok("Payment deleted successfully", true),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    async fn try_get(&self, id: Uuid) -> AppResult<payments::Model> {
        self.payments
            .find_by_id(id)
            .await
            .map_err(|e| persistence_error("Failed to load payment", &e))?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    async fn try_create(&self, input: CreatePaymentInput) -> AppResult<payments::Model> {
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount.into());
        }

        let reservation = self
            .reservations
            .find_by_id(input.reservation_id)
            .await
            .map_err(|e| persistence_error("Failed to load reservation", &e))?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

        let mut uow = UnitOfWork::new(self.db.clone());
        uow.begin().await?;

        let write = async {
            let txn = uow.txn()?;

            let payment = self
                .payments
                .insert(
                    txn,
                    NewPayment {
                        reservation_id: input.reservation_id,
                        amount: input.amount,
                        payment_method_id: input.payment_method_id,
                        is_paid: input.is_paid,
                    },
                )
                .await
                .map_err(|e| persistence_error("Failed to create payment", &e))?;

            if input.is_paid {
                self.ledger
                    .insert(
                        txn,
                        NewLedgerEntry {
                            customer_id: reservation.customer_id,
                            kind: EntryKind::Payment,
                            amount: input.amount,
                            description: Some(format!(
                                "Payment received for reservation {}",
                                reservation.id
                            )),
                            reservation_id: Some(reservation.id),
                            payment_id: Some(payment.id),
                        },
                    )
                    .await
                    .map_err(|e| persistence_error("Failed to record payment", &e))?;
            }

            Ok(payment)
        }
        .await;

        match write {
            Ok(payment) => {
                uow.commit().await?;
                tracing::info!(payment_id = %payment.id, "payment created");
                Ok(payment)
            }
            Err(err) => Err(rollback_then(&mut uow, err).await),
        }
    }

    async fn try_update(&self, input: UpdatePaymentInput) -> AppResult<payments::Model> {
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount.into());
        }

        let existing = self.try_get(input.id).await?;

        self.reservations
            .find_by_id(input.reservation_id)
            .await
            .map_err(|e| persistence_error("Failed to load reservation", &e))?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

        self.payments
            .update(
                &self.db,
                &existing,
                PaymentChanges {
                    reservation_id: input.reservation_id,
                    amount: input.amount,
                    payment_method_id: input.payment_method_id,
                    is_paid: input.is_paid,
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to update payment", &e))
    }

    async fn try_delete(&self, id: Uuid) -> AppResult<()> {
        let existing = self.try_get(id).await?;

        let deleted = self
            .payments
            .delete(&self.db, existing.id)
            .await
            .map_err(|e| persistence_error("Failed to delete payment", &e))?;
        if deleted == 0 {
            return Err(AppError::Persistence("Failed to delete payment".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use stanza_db::entities::{ledger_entries, reservations, sea_orm_active_enums};

    fn reservation_model(customer_id: Uuid) -> reservations::Model {
        reservations::Model {
            id: Uuid::now_v7(),
            room_id: 101,
            customer_id,
            start_date: Utc::now().into(),
            end_date: Utc::now().into(),
            delivery_address: None,
            created_at: Utc::now().into(),
            is_active: true,
            price: dec!(500),
            price_description: None,
        }
    }

    fn payment_model(reservation_id: Uuid, amount: Decimal, is_paid: bool) -> payments::Model {
        payments::Model {
            id: Uuid::now_v7(),
            reservation_id,
            amount,
            payment_date: Utc::now().into(),
            payment_method_id: 1,
            is_paid,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_nonpositive_amount() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = PaymentService::new(db);

        let resp = service
            .create_payment(CreatePaymentInput {
                reservation_id: Uuid::now_v7(),
                amount: dec!(0),
                payment_method_id: 1,
                is_paid: true,
            })
            .await;
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 400);
        assert_eq!(
            resp.message,
            "Validation error: Amount must be greater than zero"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_reservation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<reservations::Model>::new()])
            .into_connection();
        let service = PaymentService::new(db);

        let resp = service
            .create_payment(CreatePaymentInput {
                reservation_id: Uuid::now_v7(),
                amount: dec!(100),
                payment_method_id: 1,
                is_paid: false,
            })
            .await;
        assert_eq!(resp.status_code, 404);
        assert_eq!(resp.message, "Not found: Reservation not found");
    }

    #[tokio::test]
    async fn test_settled_payment_books_ledger_entry() {
        let customer_id = Uuid::now_v7();
        let reservation = reservation_model(customer_id);
        let payment = payment_model(reservation.id, dec!(250), true);
        let entry = ledger_entries::Model {
            id: Uuid::now_v7(),
            customer_id,
            entry_kind: sea_orm_active_enums::EntryKind::Payment,
            amount: dec!(250),
            entry_date: Utc::now().into(),
            description: None,
            reservation_id: Some(reservation.id),
            payment_id: Some(payment.id),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![reservation.clone()]])
            .append_query_results([vec![payment.clone()]])
            .append_query_results([vec![entry]])
            .into_connection();
        let service = PaymentService::new(db);

        let resp = service
            .create_payment(CreatePaymentInput {
                reservation_id: reservation.id,
                amount: dec!(250),
                payment_method_id: 1,
                is_paid: true,
            })
            .await;
        assert!(resp.succeeded, "{}", resp.message);
        assert_eq!(resp.status_code, 201);
        assert_eq!(resp.result.unwrap().amount, dec!(250));
    }

    #[tokio::test]
    async fn test_unsettled_payment_books_no_ledger_entry() {
        let reservation = reservation_model(Uuid::now_v7());
        let payment = payment_model(reservation.id, dec!(250), false);

        // No ledger result is scripted: a stray append would fail the
        // call and surface as a 500.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![reservation.clone()]])
            .append_query_results([vec![payment.clone()]])
            .into_connection();
        let service = PaymentService::new(db);

        let resp = service
            .create_payment(CreatePaymentInput {
                reservation_id: reservation.id,
                amount: dec!(250),
                payment_method_id: 1,
                is_paid: false,
            })
            .await;
        assert!(resp.succeeded, "{}", resp.message);
        assert_eq!(resp.status_code, 201);
    }

    #[tokio::test]
    async fn test_total_paid_sums_settled_payments() {
        let reservation_id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                payment_model(reservation_id, dec!(100), true),
                payment_model(reservation_id, dec!(150), true),
            ]])
            .into_connection();
        let service = PaymentService::new(db);

        let resp = service.total_paid_by_customer(Uuid::now_v7()).await;
        assert!(resp.succeeded);
        assert_eq!(resp.result, Some(dec!(250)));
    }
}
