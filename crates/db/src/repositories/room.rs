//! Room and room-status repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{room_statuses, rooms};

/// Input for inserting a room.
#[derive(Debug, Clone)]
pub struct NewRoom {
    /// Globally unique serial number.
    pub serial_number: String,
    /// Optional description.
    pub description: Option<String>,
    /// Resolved status id.
    pub status_id: i32,
}

/// Replacement field set for updating a room.
#[derive(Debug, Clone)]
pub struct RoomChanges {
    /// Globally unique serial number.
    pub serial_number: String,
    /// Optional description.
    pub description: Option<String>,
    /// Resolved status id.
    pub status_id: i32,
}

/// Repository for room queries and writes.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    db: DatabaseConnection,
}

impl RoomRepository {
    /// Creates a new room repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a room by id.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<rooms::Model>, DbErr> {
        rooms::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all rooms.
    pub async fn list_all(&self) -> Result<Vec<rooms::Model>, DbErr> {
        rooms::Entity::find()
            .order_by_asc(rooms::Column::Id)
            .all(&self.db)
            .await
    }

    /// Lists rooms holding the given status.
    pub async fn list_by_status(&self, status_id: i32) -> Result<Vec<rooms::Model>, DbErr> {
        rooms::Entity::find()
            .filter(rooms::Column::StatusId.eq(status_id))
            .order_by_asc(rooms::Column::Id)
            .all(&self.db)
            .await
    }

    /// Finds a room by serial number, optionally excluding one id
    /// (uniqueness check on update).
    pub async fn find_by_serial(
        &self,
        serial_number: &str,
        exclude: Option<i32>,
    ) -> Result<Option<rooms::Model>, DbErr> {
        let mut query =
            rooms::Entity::find().filter(rooms::Column::SerialNumber.eq(serial_number));
        if let Some(id) = exclude {
            query = query.filter(rooms::Column::Id.ne(id));
        }
        query.one(&self.db).await
    }

    /// Resolves a room status by name.
    pub async fn find_status_by_name(
        &self,
        status_name: &str,
    ) -> Result<Option<room_statuses::Model>, DbErr> {
        room_statuses::Entity::find()
            .filter(room_statuses::Column::StatusName.eq(status_name))
            .one(&self.db)
            .await
    }

    /// Inserts a new room.
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        new: NewRoom,
    ) -> Result<rooms::Model, DbErr> {
        let room = rooms::ActiveModel {
            id: NotSet,
            serial_number: Set(new.serial_number),
            description: Set(new.description),
            status_id: Set(new.status_id),
            last_updated: Set(Utc::now().into()),
        };

        room.insert(conn).await
    }

    /// Updates a room, refreshing its `last_updated` stamp.
    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        existing: &rooms::Model,
        changes: RoomChanges,
    ) -> Result<rooms::Model, DbErr> {
        let room = rooms::ActiveModel {
            id: Set(existing.id),
            serial_number: Set(changes.serial_number),
            description: Set(changes.description),
            status_id: Set(changes.status_id),
            last_updated: Set(Utc::now().into()),
        };

        room.update(conn).await
    }

    /// Deletes a room, returning the number of removed rows.
    pub async fn delete(&self, conn: &impl ConnectionTrait, id: i32) -> Result<u64, DbErr> {
        let result = rooms::Entity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected)
    }
}
