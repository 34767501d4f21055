//! Reservation lifecycle orchestration.
//!
//! Create, update, and delete keep the reservation table and the customer
//! ledger consistent: every mutation and its ledger side effect commit or
//! roll back as one unit of work. Validation and existence checks run
//! before the transaction opens; the conflict check runs inside it, at
//! serializable isolation, so two concurrent bookings of the same room
//! cannot both pass.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use stanza_core::booking::{BookingError, has_conflict, validate_interval, validate_price};
use stanza_core::ledger::{EntryKind, price_adjustment};
use stanza_db::entities::reservations;
use stanza_db::repositories::ledger::NewLedgerEntry;
use stanza_db::repositories::reservation::{NewReservation, ReservationChanges};
use stanza_db::{
    CustomerRepository, LedgerEntryRepository, ReservationRepository, RoomRepository, UnitOfWork,
};
use stanza_shared::types::ReservationId;
use stanza_shared::{AppError, AppResult, ServiceResponse};

use crate::{persistence_error, rollback_then};

/// Input for creating a reservation.
#[derive(Debug, Clone)]
pub struct CreateReservationInput {
    /// Room being reserved.
    pub room_id: i32,
    /// Customer holding the reservation.
    pub customer_id: Uuid,
    /// Inclusive start of the stay.
    pub start_date: DateTime<Utc>,
    /// Exclusive end of the stay.
    pub end_date: DateTime<Utc>,
    /// Agreed price; becomes a debt on the customer's ledger.
    pub price: Decimal,
    /// Optional delivery address.
    pub delivery_address: Option<String>,
    /// Optional price note.
    pub price_description: Option<String>,
}

/// Input for updating a reservation. All booking fields are replaced; the
/// creation timestamp never is.
#[derive(Debug, Clone)]
pub struct UpdateReservationInput {
    /// Reservation to update.
    pub id: Uuid,
    /// Target room (conflict-checked even when unchanged).
    pub room_id: i32,
    /// Customer holding the reservation.
    pub customer_id: Uuid,
    /// Inclusive start of the stay.
    pub start_date: DateTime<Utc>,
    /// Exclusive end of the stay.
    pub end_date: DateTime<Utc>,
    /// New price; a change appends one compensating ledger entry.
    pub price: Decimal,
    /// Optional delivery address.
    pub delivery_address: Option<String>,
    /// Optional price note.
    pub price_description: Option<String>,
}

/// Orchestrates the reservation lifecycle.
#[derive(Debug, Clone)]
pub struct ReservationService {
    db: DatabaseConnection,
    reservations: ReservationRepository,
    customers: CustomerRepository,
    rooms: RoomRepository,
    ledger: LedgerEntryRepository,
}

impl ReservationService {
    /// Creates a reservation service over the given connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            reservations: ReservationRepository::new(db.clone()),
            customers: CustomerRepository::new(db.clone()),
            rooms: RoomRepository::new(db.clone()),
            ledger: LedgerEntryRepository::new(db.clone()),
            db,
        }
    }

    /// Returns a reservation by id.
    pub async fn get_reservation(&self, id: Uuid) -> ServiceResponse<reservations::Model> {
        match self.try_get(id).await {
            Ok(model) => ServiceResponse::ok("Reservation retrieved successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Lists all reservations.
    pub async fn list_reservations(&self) -> ServiceResponse<Vec<reservations::Model>> {
        match self.reservations.list_all().await {
            Ok(models) => ServiceResponse::ok("Reservations retrieved successfully", models),
            Err(err) => {
                ServiceResponse::failure(&persistence_error("Failed to retrieve reservations", &err))
            }
        }
    }

    /// Lists all active reservations.
    pub async fn list_active_reservations(&self) -> ServiceResponse<Vec<reservations::Model>> {
        match self.reservations.list_active().await {
            Ok(models) => {
                ServiceResponse::ok("Active reservations retrieved successfully", models)
            }
            Err(err) => ServiceResponse::failure(&persistence_error(
                "Failed to retrieve active reservations",
                &err,
            )),
        }
    }

    /// Lists active reservations whose stay has already ended.
    pub async fn list_expired_reservations(&self) -> ServiceResponse<Vec<reservations::Model>> {
        match self.reservations.list_expired(Utc::now()).await {
            Ok(models) => {
                ServiceResponse::ok("Expired reservations retrieved successfully", models)
            }
            Err(err) => ServiceResponse::failure(&persistence_error(
                "Failed to retrieve expired reservations",
                &err,
            )),
        }
    }

    /// Lists active reservations touching the given date range.
    pub async fn list_reservations_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResponse<Vec<reservations::Model>> {
        if let Err(err) = validate_interval(start, end) {
            return ServiceResponse::failure(&err.into());
        }
        match self.reservations.list_by_date_range(start, end).await {
            Ok(models) => ServiceResponse::ok("Reservations retrieved successfully", models),
            Err(err) => {
                ServiceResponse::failure(&persistence_error("Failed to retrieve reservations", &err))
            }
        }
    }

    /// Creates a reservation and books its price as a debt, atomically.
    pub async fn create_reservation(
        &self,
        input: CreateReservationInput,
    ) -> ServiceResponse<reservations::Model> {
        match self.try_create(input).await {
            Ok(model) => ServiceResponse::created("Reservation created successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Updates a reservation; a price change appends one compensating
    /// ledger entry, atomically with the update.
    pub async fn update_reservation(
        &self,
        input: UpdateReservationInput,
    ) -> ServiceResponse<reservations::Model> {
        match self.try_update(input).await {
            Ok(model) => ServiceResponse::ok("Reservation updated successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Deletes a reservation and refunds its full price, atomically.
    pub async fn delete_reservation(&self, id: Uuid) -> ServiceResponse<bool> {
        match self.try_delete(id).await {
            Ok(()) => ServiceResponse::ok("Reservation deleted successfully", true),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    async fn try_get(&self, id: Uuid) -> AppResult<reservations::Model> {
        self.reservations
            .find_by_id(id)
            .await
            .map_err(|e| persistence_error("Failed to load reservation", &e))?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))
    }

    async fn try_create(&self, input: CreateReservationInput) -> AppResult<reservations::Model> {
        validate_interval(input.start_date, input.end_date)?;
        validate_price(input.price)?;

        self.customers
            .find_by_id(input.customer_id)
            .await
            .map_err(|e| persistence_error("Failed to load customer", &e))?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;

        self.rooms
            .find_by_id(input.room_id)
            .await
            .map_err(|e| persistence_error("Failed to load room", &e))?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        let mut uow = UnitOfWork::new(self.db.clone());
        uow.begin().await?;

        match self.write_create(&uow, &input).await {
            Ok(model) => {
                uow.commit().await?;
                tracing::info!(reservation_id = %model.id, room_id = model.room_id, "reservation created");
                Ok(model)
            }
            Err(err) => Err(rollback_then(&mut uow, err).await),
        }
    }

    async fn write_create(
        &self,
        uow: &UnitOfWork,
        input: &CreateReservationInput,
    ) -> AppResult<reservations::Model> {
        let txn = uow.txn()?;

        let booked = self
            .reservations
            .active_intervals_for_room(txn, input.room_id)
            .await
            .map_err(|e| persistence_error("Failed to check reservation conflicts", &e))?;
        if has_conflict(input.start_date, input.end_date, &booked, None) {
            return Err(BookingError::RoomAlreadyBooked.into());
        }

        let reservation = self
            .reservations
            .insert(
                txn,
                NewReservation {
                    room_id: input.room_id,
                    customer_id: input.customer_id,
                    start_date: input.start_date,
                    end_date: input.end_date,
                    delivery_address: input.delivery_address.clone(),
                    price: input.price,
                    price_description: input.price_description.clone(),
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to create reservation", &e))?;

        self.ledger
            .insert(
                txn,
                NewLedgerEntry {
                    customer_id: input.customer_id,
                    kind: EntryKind::Debt,
                    amount: input.price,
                    description: Some(format!("Debt for reservation {}", reservation.id)),
                    reservation_id: Some(reservation.id),
                    payment_id: None,
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to record reservation debt", &e))?;

        Ok(reservation)
    }

    async fn try_update(&self, input: UpdateReservationInput) -> AppResult<reservations::Model> {
        validate_interval(input.start_date, input.end_date)?;
        validate_price(input.price)?;

        let existing = self.try_get(input.id).await?;

        self.customers
            .find_by_id(input.customer_id)
            .await
            .map_err(|e| persistence_error("Failed to load customer", &e))?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;

        self.rooms
            .find_by_id(input.room_id)
            .await
            .map_err(|e| persistence_error("Failed to load room", &e))?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        let mut uow = UnitOfWork::new(self.db.clone());
        uow.begin().await?;

        match self.write_update(&uow, &existing, &input).await {
            Ok(model) => {
                uow.commit().await?;
                tracing::info!(reservation_id = %model.id, "reservation updated");
                Ok(model)
            }
            Err(err) => Err(rollback_then(&mut uow, err).await),
        }
    }

    async fn write_update(
        &self,
        uow: &UnitOfWork,
        existing: &reservations::Model,
        input: &UpdateReservationInput,
    ) -> AppResult<reservations::Model> {
        let txn = uow.txn()?;

        // The check always runs against the target room and always skips
        // the reservation being updated: moving within its own dates must
        // not conflict with itself.
        let booked = self
            .reservations
            .active_intervals_for_room(txn, input.room_id)
            .await
            .map_err(|e| persistence_error("Failed to check reservation conflicts", &e))?;
        if has_conflict(
            input.start_date,
            input.end_date,
            &booked,
            Some(ReservationId::from_uuid(existing.id)),
        ) {
            return Err(BookingError::RoomAlreadyBooked.into());
        }

        let updated = self
            .reservations
            .update(
                txn,
                existing,
                ReservationChanges {
                    room_id: input.room_id,
                    customer_id: input.customer_id,
                    start_date: input.start_date,
                    end_date: input.end_date,
                    delivery_address: input.delivery_address.clone(),
                    price: input.price,
                    price_description: input.price_description.clone(),
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to update reservation", &e))?;

        if let Some((kind, amount)) = price_adjustment(existing.price, input.price) {
            self.ledger
                .insert(
                    txn,
                    NewLedgerEntry {
                        customer_id: input.customer_id,
                        kind,
                        amount,
                        description: Some(format!(
                            "Price adjustment for reservation {}",
                            existing.id
                        )),
                        reservation_id: Some(existing.id),
                        payment_id: None,
                    },
                )
                .await
                .map_err(|e| persistence_error("Failed to record price adjustment", &e))?;
        }

        Ok(updated)
    }

    async fn try_delete(&self, id: Uuid) -> AppResult<()> {
        let existing = self.try_get(id).await?;

        let mut uow = UnitOfWork::new(self.db.clone());
        uow.begin().await?;

        match self.write_delete(&uow, &existing).await {
            Ok(()) => {
                uow.commit().await?;
                tracing::info!(reservation_id = %existing.id, "reservation deleted");
                Ok(())
            }
            Err(err) => Err(rollback_then(&mut uow, err).await),
        }
    }

    async fn write_delete(&self, uow: &UnitOfWork, existing: &reservations::Model) -> AppResult<()> {
        let txn = uow.txn()?;

        let deleted = self
            .reservations
            .delete(txn, existing.id)
            .await
            .map_err(|e| persistence_error("Failed to delete reservation", &e))?;
        if deleted == 0 {
            return Err(AppError::Persistence(
                "Failed to delete reservation".to_string(),
            ));
        }

        // The reservation row is gone, so the refund carries its id in the
        // description rather than as a provenance link.
        self.ledger
            .insert(
                txn,
                NewLedgerEntry {
                    customer_id: existing.customer_id,
                    kind: EntryKind::Refund,
                    amount: existing.price,
                    description: Some(format!(
                        "Refund for cancelled reservation {}",
                        existing.id
                    )),
                    reservation_id: None,
                    payment_id: None,
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to record cancellation refund", &e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use stanza_db::entities::{customers, ledger_entries, rooms, sea_orm_active_enums};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, d, 0, 0, 0).unwrap()
    }

    fn customer_model() -> customers::Model {
        customers::Model {
            id: Uuid::now_v7(),
            full_name: "Ada Lovelace".to_string(),
            phone_number: None,
            address: None,
            email: None,
            created_at: Utc::now().into(),
        }
    }

    fn room_model(id: i32) -> rooms::Model {
        rooms::Model {
            id,
            serial_number: format!("R-{id:03}"),
            description: None,
            status_id: 1,
            last_updated: Utc::now().into(),
        }
    }

    fn reservation_model(
        room_id: i32,
        customer_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        price: Decimal,
    ) -> reservations::Model {
        reservations::Model {
            id: Uuid::now_v7(),
            room_id,
            customer_id,
            start_date: start.into(),
            end_date: end.into(),
            delivery_address: None,
            created_at: Utc::now().into(),
            is_active: true,
            price,
            price_description: None,
        }
    }

    fn debt_entry(customer_id: Uuid, reservation_id: Uuid, amount: Decimal) -> ledger_entries::Model {
        ledger_entries::Model {
            id: Uuid::now_v7(),
            customer_id,
            entry_kind: sea_orm_active_enums::EntryKind::Debt,
            amount,
            entry_date: Utc::now().into(),
            description: None,
            reservation_id: Some(reservation_id),
            payment_id: None,
        }
    }

    fn create_input(room_id: i32, customer_id: Uuid) -> CreateReservationInput {
        CreateReservationInput {
            room_id,
            customer_id,
            start_date: day(10),
            end_date: day(15),
            price: dec!(500),
            delivery_address: None,
            price_description: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_interval() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = ReservationService::new(db);

        let mut input = create_input(101, Uuid::now_v7());
        input.start_date = day(15);
        input.end_date = day(10);

        let resp = service.create_reservation(input).await;
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.message, "Validation error: Start date must be before end date");
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_customer() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .into_connection();
        let service = ReservationService::new(db);

        let resp = service.create_reservation(create_input(101, Uuid::now_v7())).await;
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 404);
        assert_eq!(resp.message, "Not found: Customer not found");
    }

    #[tokio::test]
    async fn test_create_rejects_overlapping_interval() {
        let customer = customer_model();
        // Room 101 already holds [10, 15); the request for [12, 14) must
        // be rejected as a business-rule error.
        let existing = reservation_model(101, customer.id, day(10), day(15), dec!(300));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![customer.clone()]])
            .append_query_results([vec![room_model(101)]])
            .append_query_results([vec![existing]])
            .into_connection();
        let service = ReservationService::new(db);

        let mut input = create_input(101, customer.id);
        input.start_date = day(12);
        input.end_date = day(14);

        let resp = service.create_reservation(input).await;
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 400);
        assert_eq!(
            resp.message,
            "Conflict: The room is already booked for the selected dates"
        );
    }

    #[tokio::test]
    async fn test_create_allows_abutting_interval() {
        let customer = customer_model();
        let existing = reservation_model(101, customer.id, day(10), day(15), dec!(300));
        let inserted = reservation_model(101, customer.id, day(15), day(20), dec!(500));
        let entry = debt_entry(customer.id, inserted.id, dec!(500));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![customer.clone()]])
            .append_query_results([vec![room_model(101)]])
            .append_query_results([vec![existing]])
            .append_query_results([vec![inserted.clone()]])
            .append_query_results([vec![entry]])
            .into_connection();
        let service = ReservationService::new(db);

        let mut input = create_input(101, customer.id);
        input.start_date = day(15);
        input.end_date = day(20);

        let resp = service.create_reservation(input).await;
        assert!(resp.succeeded, "abutting interval must not conflict: {}", resp.message);
        assert_eq!(resp.status_code, 201);
        assert_eq!(resp.result.unwrap().id, inserted.id);
    }

    #[tokio::test]
    async fn test_create_rolls_back_when_ledger_write_fails() {
        let customer = customer_model();
        let inserted = reservation_model(101, customer.id, day(10), day(15), dec!(500));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![customer.clone()]])
            .append_query_results([vec![room_model(101)]])
            .append_query_results([Vec::<reservations::Model>::new()])
            .append_query_results([vec![inserted]])
            .append_query_errors([DbErr::Custom("ledger write refused".to_string())])
            .into_connection();
        let service = ReservationService::new(db);

        let resp = service.create_reservation(create_input(101, customer.id)).await;
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 500);
        // The raw database error never reaches the envelope.
        assert_eq!(
            resp.message,
            "Persistence error: Failed to record reservation debt"
        );
    }

    #[tokio::test]
    async fn test_update_with_unchanged_price_appends_no_ledger_entry() {
        let customer = customer_model();
        let existing = reservation_model(101, customer.id, day(10), day(15), dec!(500));
        let updated = reservations::Model {
            end_date: day(16).into(),
            ..existing.clone()
        };

        // No ledger-entry result is scripted: if the service tried to
        // append one, the mock would fail the call and the envelope would
        // come back 500 instead of 200.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![customer.clone()]])
            .append_query_results([vec![room_model(101)]])
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![updated.clone()]])
            .into_connection();
        let service = ReservationService::new(db);

        let input = UpdateReservationInput {
            id: existing.id,
            room_id: 101,
            customer_id: customer.id,
            start_date: day(10),
            end_date: day(16),
            price: dec!(500),
            delivery_address: None,
            price_description: None,
        };

        let resp = service.update_reservation(input).await;
        assert!(resp.succeeded, "{}", resp.message);
        assert_eq!(resp.status_code, 200);
        // The stored creation timestamp survives the update.
        assert_eq!(resp.result.unwrap().created_at, existing.created_at);
    }

    #[tokio::test]
    async fn test_update_excludes_own_interval_from_conflict_check() {
        let customer = customer_model();
        let existing = reservation_model(101, customer.id, day(10), day(15), dec!(500));
        let raised = reservations::Model {
            price: dec!(650),
            ..existing.clone()
        };
        let entry = debt_entry(customer.id, existing.id, dec!(150));

        // The only active interval for the room is the reservation's own;
        // re-booking the same dates at a new price must succeed.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![customer.clone()]])
            .append_query_results([vec![room_model(101)]])
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![raised.clone()]])
            .append_query_results([vec![entry]])
            .into_connection();
        let service = ReservationService::new(db);

        let input = UpdateReservationInput {
            id: existing.id,
            room_id: 101,
            customer_id: customer.id,
            start_date: day(10),
            end_date: day(15),
            price: dec!(650),
            delivery_address: None,
            price_description: None,
        };

        let resp = service.update_reservation(input).await;
        assert!(resp.succeeded, "{}", resp.message);
        assert_eq!(resp.result.unwrap().price, dec!(650));
    }

    #[tokio::test]
    async fn test_update_missing_reservation_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<reservations::Model>::new()])
            .into_connection();
        let service = ReservationService::new(db);

        let input = UpdateReservationInput {
            id: Uuid::now_v7(),
            room_id: 101,
            customer_id: Uuid::now_v7(),
            start_date: day(10),
            end_date: day(15),
            price: dec!(500),
            delivery_address: None,
            price_description: None,
        };

        let resp = service.update_reservation(input).await;
        assert_eq!(resp.status_code, 404);
        assert_eq!(resp.message, "Not found: Reservation not found");
    }

    #[tokio::test]
    async fn test_delete_refunds_full_price() {
        let customer = customer_model();
        let existing = reservation_model(101, customer.id, day(10), day(15), dec!(500));
        let refund = ledger_entries::Model {
            id: Uuid::now_v7(),
            customer_id: customer.id,
            entry_kind: sea_orm_active_enums::EntryKind::Refund,
            amount: dec!(500),
            entry_date: Utc::now().into(),
            description: None,
            reservation_id: None,
            payment_id: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![refund]])
            .into_connection();
        let service = ReservationService::new(db);

        let resp = service.delete_reservation(existing.id).await;
        assert!(resp.succeeded, "{}", resp.message);
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.result, Some(true));
    }

    #[tokio::test]
    async fn test_delete_missing_reservation_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<reservations::Model>::new()])
            .into_connection();
        let service = ReservationService::new(db);

        let resp = service.delete_reservation(Uuid::now_v7()).await;
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 404);
    }
}
