//! Uniform result envelope returned by every service operation.
//!
//! Services report outcomes as structured values, never as propagated
//! errors: callers (thin request handlers) inspect `succeeded` and
//! `status_code` instead of catching anything.

use serde::Serialize;

use crate::error::AppError;

/// Result envelope for a single service operation.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse<T> {
    /// Whether the operation succeeded.
    pub succeeded: bool,
    /// Status code: 200 read/update/delete, 201 create, 400 validation or
    /// business rule, 404 missing referent, 500 persistence failure.
    pub status_code: u16,
    /// Human-readable outcome message.
    pub message: String,
    /// The operation result, when one exists.
    pub result: Option<T>,
}

impl<T> ServiceResponse<T> {
    /// Read/update/delete success (200).
    #[must_use]
    pub fn ok(message: impl Into<String>, result: T) -> Self {
        Self {
            succeeded: true,
            status_code: 200,
            message: message.into(),
            result: Some(result),
        }
    }

    /// Creation success (201).
    #[must_use]
    pub fn created(message: impl Into<String>, result: T) -> Self {
        Self {
            succeeded: true,
            status_code: 201,
            message: message.into(),
            result: Some(result),
        }
    }

    /// Failure envelope built from an application error.
    #[must_use]
    pub fn failure(error: &AppError) -> Self {
        Self {
            succeeded: false,
            status_code: error.status_code(),
            message: error.to_string(),
            result: None,
        }
    }
}

impl<T> From<AppError> for ServiceResponse<T> {
    fn from(error: AppError) -> Self {
        Self::failure(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let resp = ServiceResponse::ok("Reservation retrieved successfully", 42);
        assert!(resp.succeeded);
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.result, Some(42));
    }

    #[test]
    fn test_created_envelope() {
        let resp = ServiceResponse::created("Reservation created successfully", "id");
        assert!(resp.succeeded);
        assert_eq!(resp.status_code, 201);
        assert_eq!(resp.result, Some("id"));
    }

    #[test]
    fn test_failure_envelope_carries_status() {
        let resp: ServiceResponse<()> =
            ServiceResponse::failure(&AppError::NotFound("Room not found".into()));
        assert!(!resp.succeeded);
        assert_eq!(resp.status_code, 404);
        assert_eq!(resp.message, "Not found: Room not found");
        assert!(resp.result.is_none());
    }

    #[test]
    fn test_from_error() {
        let resp: ServiceResponse<u8> =
            AppError::Validation("price must not be negative".into()).into();
        assert_eq!(resp.status_code, 400);
        assert!(!resp.succeeded);
    }
}
