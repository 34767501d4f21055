//! Reservation repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use stanza_core::booking::BookedInterval;
use stanza_shared::types::ReservationId;

use crate::entities::reservations;

/// Input for inserting a reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    /// Room being reserved.
    pub room_id: i32,
    /// Customer holding the reservation.
    pub customer_id: Uuid,
    /// Inclusive start of the stay.
    pub start_date: DateTime<Utc>,
    /// Exclusive end of the stay.
    pub end_date: DateTime<Utc>,
    /// Optional delivery address.
    pub delivery_address: Option<String>,
    /// Agreed price.
    pub price: Decimal,
    /// Optional price note.
    pub price_description: Option<String>,
}

/// Replacement field set for updating a reservation.
///
/// The creation timestamp and active flag are preserved from the stored
/// row, never taken from input.
#[derive(Debug, Clone)]
pub struct ReservationChanges {
    /// Target room (may differ from the stored one).
    pub room_id: i32,
    /// Customer holding the reservation.
    pub customer_id: Uuid,
    /// Inclusive start of the stay.
    pub start_date: DateTime<Utc>,
    /// Exclusive end of the stay.
    pub end_date: DateTime<Utc>,
    /// Optional delivery address.
    pub delivery_address: Option<String>,
    /// New price.
    pub price: Decimal,
    /// Optional price note.
    pub price_description: Option<String>,
}

/// Repository for reservation queries and writes.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    db: DatabaseConnection,
}

impl ReservationRepository {
    /// Creates a new reservation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a reservation by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<reservations::Model>, DbErr> {
        reservations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all reservations ordered by start date.
    pub async fn list_all(&self) -> Result<Vec<reservations::Model>, DbErr> {
        reservations::Entity::find()
            .order_by_asc(reservations::Column::StartDate)
            .all(&self.db)
            .await
    }

    /// Lists all active reservations.
    pub async fn list_active(&self) -> Result<Vec<reservations::Model>, DbErr> {
        reservations::Entity::find()
            .filter(reservations::Column::IsActive.eq(true))
            .order_by_asc(reservations::Column::StartDate)
            .all(&self.db)
            .await
    }

    /// Lists active reservations whose stay has already ended.
    pub async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<reservations::Model>, DbErr> {
        reservations::Entity::find()
            .filter(reservations::Column::IsActive.eq(true))
            .filter(reservations::Column::EndDate.lt(now))
            .order_by_asc(reservations::Column::EndDate)
            .all(&self.db)
            .await
    }

    /// Lists active reservations touching the given date range.
    pub async fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<reservations::Model>, DbErr> {
        reservations::Entity::find()
            .filter(reservations::Column::IsActive.eq(true))
            .filter(reservations::Column::StartDate.lte(end))
            .filter(reservations::Column::EndDate.gte(start))
            .order_by_asc(reservations::Column::StartDate)
            .all(&self.db)
            .await
    }

    /// Lists all reservations of a customer.
    pub async fn find_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<reservations::Model>, DbErr> {
        reservations::Entity::find()
            .filter(reservations::Column::CustomerId.eq(customer_id))
            .order_by_asc(reservations::Column::StartDate)
            .all(&self.db)
            .await
    }

    /// Lists a customer's active reservations (deletion guard input).
    pub async fn find_active_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<reservations::Model>, DbErr> {
        reservations::Entity::find()
            .filter(reservations::Column::CustomerId.eq(customer_id))
            .filter(reservations::Column::IsActive.eq(true))
            .all(&self.db)
            .await
    }

    /// Lists a room's active reservations (deletion guard input).
    pub async fn find_active_by_room(
        &self,
        room_id: i32,
    ) -> Result<Vec<reservations::Model>, DbErr> {
        reservations::Entity::find()
            .filter(reservations::Column::RoomId.eq(room_id))
            .filter(reservations::Column::IsActive.eq(true))
            .all(&self.db)
            .await
    }

    /// Reads the occupied intervals of a room's active reservations.
    ///
    /// Takes an explicit connection so the conflict check can run inside
    /// the same serializable transaction as the subsequent insert.
    pub async fn active_intervals_for_room(
        &self,
        conn: &impl ConnectionTrait,
        room_id: i32,
    ) -> Result<Vec<BookedInterval>, DbErr> {
        let rows = reservations::Entity::find()
            .filter(reservations::Column::RoomId.eq(room_id))
            .filter(reservations::Column::IsActive.eq(true))
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| BookedInterval {
                reservation_id: ReservationId::from_uuid(r.id),
                start: r.start_date.with_timezone(&Utc),
                end: r.end_date.with_timezone(&Utc),
            })
            .collect())
    }

    /// Inserts a new active reservation.
    pub async fn insert(
        &self,
        txn: &DatabaseTransaction,
        new: NewReservation,
    ) -> Result<reservations::Model, DbErr> {
        let now = Utc::now().into();

        let reservation = reservations::ActiveModel {
            id: Set(ReservationId::new().into_inner()),
            room_id: Set(new.room_id),
            customer_id: Set(new.customer_id),
            start_date: Set(new.start_date.into()),
            end_date: Set(new.end_date.into()),
            delivery_address: Set(new.delivery_address),
            created_at: Set(now),
            is_active: Set(true),
            price: Set(new.price),
            price_description: Set(new.price_description),
        };

        reservation.insert(txn).await
    }

    /// Updates a reservation, preserving its creation timestamp and
    /// active flag.
    pub async fn update(
        &self,
        txn: &DatabaseTransaction,
        existing: &reservations::Model,
        changes: ReservationChanges,
    ) -> Result<reservations::Model, DbErr> {
        let reservation = reservations::ActiveModel {
            id: Set(existing.id),
            room_id: Set(changes.room_id),
            customer_id: Set(changes.customer_id),
            start_date: Set(changes.start_date.into()),
            end_date: Set(changes.end_date.into()),
            delivery_address: Set(changes.delivery_address),
            created_at: Set(existing.created_at),
            is_active: Set(existing.is_active),
            price: Set(changes.price),
            price_description: Set(changes.price_description),
        };

        reservation.update(txn).await
    }

    /// Deletes a reservation, returning the number of removed rows.
    pub async fn delete(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        let result = reservations::Entity::delete_by_id(id).exec(txn).await?;
        Ok(result.rows_affected)
    }
}
