//! Room service and deletion guard.

use sea_orm::DatabaseConnection;

use stanza_core::booking::check_room_deletable;
use stanza_db::entities::rooms;
use stanza_db::repositories::room::{NewRoom, RoomChanges};
use stanza_db::{ReservationRepository, RoomRepository};
use stanza_shared::{AppError, AppResult, ServiceResponse};

use crate::persistence_error;

/// Input for creating a room.
#[derive(Debug, Clone)]
pub struct CreateRoomInput {
    /// Globally unique serial number.
    pub serial_number: String,
    /// Optional description.
    pub description: Option<String>,
    /// Status name; must resolve against the status reference table.
    pub status_name: String,
}

/// Input for updating a room.
#[derive(Debug, Clone)]
pub struct UpdateRoomInput {
    /// Room to update.
    pub id: i32,
    /// Globally unique serial number.
    pub serial_number: String,
    /// Optional description.
    pub description: Option<String>,
    /// Status name; must resolve against the status reference table.
    pub status_name: String,
}

/// Room lifecycle and status management.
#[derive(Debug, Clone)]
pub struct RoomService {
    db: DatabaseConnection,
    rooms: RoomRepository,
    reservations: ReservationRepository,
}

impl RoomService {
    /// Creates a room service over the given connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            rooms: RoomRepository::new(db.clone()),
            reservations: ReservationRepository::new(db.clone()),
            db,
        }
    }

    /// Lists all rooms.
    pub async fn list_rooms(&self) -> ServiceResponse<Vec<rooms::Model>> {
        match self.rooms.list_all().await {
            Ok(models) => ServiceResponse::ok("Rooms retrieved successfully", models),
            Err(err) => {
                ServiceResponse::failure(&persistence_error("Failed to retrieve rooms", &err))
            }
        }
    }

    /// Creates a room.
    pub async fn create_room(&self, input: CreateRoomInput) -> ServiceResponse<rooms::Model> {
        match self.try_create(input).await {
            Ok(model) => ServiceResponse::created("Room created successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Updates a room.
    pub async fn update_room(&self, input: UpdateRoomInput) -> ServiceResponse<rooms::Model> {
        match self.try_update(input).await {
            Ok(model) => ServiceResponse::ok("Room updated successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Moves a room to another status, keeping everything else.
    pub async fn update_room_status(
        &self,
        id: i32,
        status_name: &str,
    ) -> ServiceResponse<rooms::Model> {
        match self.try_update_status(id, status_name).await {
            Ok(model) => ServiceResponse::ok("Room status updated successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Deletes a room, unless active reservations still reference it.
    pub async fn delete_room(&self, id: i32) -> ServiceResponse<bool> {
        match self.try_delete(id).await {
            Ok(()) => ServiceResponse::ok("Room deleted successfully", true),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Lists rooms currently available for booking.
    pub async fn list_available_rooms(&self) -> ServiceResponse<Vec<rooms::Model>> {
        match self.try_list_by_status("Available").await {
            Ok(models) => ServiceResponse::ok("Available rooms retrieved successfully", models),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Lists rooms holding the given status.
    pub async fn list_rooms_by_status(&self, status_name: &str) -> ServiceResponse<Vec<rooms::Model>> {
        if status_name.trim().is_empty() {
            return ServiceResponse::failure(&AppError::Validation(
                "Status name cannot be empty".to_string(),
            ));
        }
        match self.try_list_by_status(status_name).await {
            Ok(models) => ServiceResponse::ok("Rooms retrieved successfully", models),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    async fn try_get(&self, id: i32) -> AppResult<rooms::Model> {
        self.rooms
            .find_by_id(id)
            .await
            .map_err(|e| persistence_error("Failed to load room", &e))?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))
    }

    async fn resolve_status(&self, status_name: &str) -> AppResult<i32> {
        self.rooms
            .find_status_by_name(status_name)
            .await
            .map_err(|e| persistence_error("Failed to resolve room status", &e))?
            .map(|status| status.id)
            .ok_or_else(|| AppError::Validation(format!("Invalid room status: {status_name}")))
    }

    async fn ensure_serial_unique(
        &self,
        serial_number: &str,
        exclude: Option<i32>,
    ) -> AppResult<()> {
        let holder = self
            .rooms
            .find_by_serial(serial_number, exclude)
            .await
            .map_err(|e| persistence_error("Failed to check serial number uniqueness", &e))?;
        if holder.is_some() {
            return Err(AppError::Conflict(
                "Room with this serial number already exists".to_string(),
            ));
        }
        Ok(())
    }

    async fn try_create(&self, input: CreateRoomInput) -> AppResult<rooms::Model> {
        self.ensure_serial_unique(&input.serial_number, None).await?;
        let status_id = self.resolve_status(&input.status_name).await?;

        let room = self
            .rooms
            .insert(
                &self.db,
                NewRoom {
                    serial_number: input.serial_number,
                    description: input.description,
                    status_id,
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to create room", &e))?;

        tracing::info!(room_id = room.id, "room created");
        Ok(room)
    }

    async fn try_update(&self, input: UpdateRoomInput) -> AppResult<rooms::Model> {
        let existing = self.try_get(input.id).await?;
        self.ensure_serial_unique(&input.serial_number, Some(existing.id))
            .await?;
        let status_id = self.resolve_status(&input.status_name).await?;

        self.rooms
            .update(
                &self.db,
                &existing,
                RoomChanges {
                    serial_number: input.serial_number,
                    description: input.description,
                    status_id,
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to update room", &e))
    }

    async fn try_update_status(&self, id: i32, status_name: &str) -> AppResult<rooms::Model> {
        let status_id = self.resolve_status(status_name).await?;
        let existing = self.try_get(id).await?;

        self.rooms
            .update(
                &self.db,
                &existing,
                RoomChanges {
                    serial_number: existing.serial_number.clone(),
                    description: existing.description.clone(),
                    status_id,
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to update room status", &e))
    }

    async fn try_delete(&self, id: i32) -> AppResult<()> {
        let existing = self.try_get(id).await?;

        let active = self
            .reservations
            .find_active_by_room(existing.id)
            .await
            .map_err(|e| persistence_error("Failed to load room reservations", &e))?;
        check_room_deletable(active.len())?;

        let deleted = self
            .rooms
            .delete(&self.db, existing.id)
            .await
            .map_err(|e| persistence_error("Failed to delete room", &e))?;
        if deleted == 0 {
            return Err(AppError::Persistence("Failed to delete room".to_string()));
        }

        tracing::info!(room_id = existing.id, "room deleted");
        Ok(())
    }

    async fn try_list_by_status(&self, status_name: &str) -> AppResult<Vec<rooms::Model>> {
        let status_id = self.resolve_status(status_name).await?;
        self.rooms
            .list_by_status(status_id)
            .await
            .map_err(|e| persistence_error("Failed to retrieve rooms", &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use stanza_db::entities::{reservations, room_statuses};
    use uuid::Uuid;

    fn room_model(id: i32, serial: &str) -> rooms::Model {
        rooms::Model {
            id,
            serial_number: serial.to_string(),
            description: None,
            status_id: 1,
            last_updated: Utc::now().into(),
        }
    }

    fn status_model(id: i32, name: &str) -> room_statuses::Model {
        room_statuses::Model {
            id,
            status_name: name.to_string(),
            description: None,
        }
    }

    fn active_reservation(room_id: i32) -> reservations::Model {
        reservations::Model {
            id: Uuid::now_v7(),
            room_id,
            customer_id: Uuid::now_v7(),
            start_date: Utc::now().into(),
            end_date: Utc::now().into(),
            delivery_address: None,
            created_at: Utc::now().into(),
            is_active: true,
            price: dec!(100),
            price_description: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_serial() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![room_model(7, "R-007")]])
            .into_connection();
        let service = RoomService::new(db);

        let resp = service
            .create_room(CreateRoomInput {
                serial_number: "R-007".to_string(),
                description: None,
                status_name: "Available".to_string(),
            })
            .await;
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 400);
        assert_eq!(
            resp.message,
            "Conflict: Room with this serial number already exists"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<rooms::Model>::new()])
            .append_query_results([Vec::<room_statuses::Model>::new()])
            .into_connection();
        let service = RoomService::new(db);

        let resp = service
            .create_room(CreateRoomInput {
                serial_number: "R-008".to_string(),
                description: None,
                status_name: "Haunted".to_string(),
            })
            .await;
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.message, "Validation error: Invalid room status: Haunted");
    }

    #[tokio::test]
    async fn test_create_room() {
        let created = room_model(9, "R-009");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<rooms::Model>::new()])
            .append_query_results([vec![status_model(1, "Available")]])
            .append_query_results([vec![created.clone()]])
            .into_connection();
        let service = RoomService::new(db);

        let resp = service
            .create_room(CreateRoomInput {
                serial_number: "R-009".to_string(),
                description: None,
                status_name: "Available".to_string(),
            })
            .await;
        assert!(resp.succeeded, "{}", resp.message);
        assert_eq!(resp.status_code, 201);
        assert_eq!(resp.result.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_active_reservation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![room_model(7, "R-007")]])
            .append_query_results([vec![active_reservation(7)]])
            .into_connection();
        let service = RoomService::new(db);

        let resp = service.delete_room(7).await;
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 400);
        assert_eq!(
            resp.message,
            "Conflict: Cannot delete room with active reservations"
        );
    }

    #[tokio::test]
    async fn test_delete_idle_room_succeeds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![room_model(7, "R-007")]])
            .append_query_results([Vec::<reservations::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = RoomService::new(db);

        let resp = service.delete_room(7).await;
        assert!(resp.succeeded, "{}", resp.message);
        assert_eq!(resp.result, Some(true));
    }
}
