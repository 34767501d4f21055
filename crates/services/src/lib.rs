//! Business logic services for Stanza.
//!
//! Each service orchestrates one entity's lifecycle: it validates input,
//! resolves referenced entities, consults the pure decision logic in
//! `stanza-core`, and drives all writes through a per-operation
//! [`stanza_db::UnitOfWork`]. Every public method reports its outcome as a
//! [`stanza_shared::ServiceResponse`] envelope; nothing is thrown across
//! the service boundary.

pub mod customer;
pub mod payment;
pub mod reservation;
pub mod room;

pub use customer::CustomerService;
pub use payment::PaymentService;
pub use reservation::ReservationService;
pub use room::RoomService;

use sea_orm::DbErr;

use stanza_db::UnitOfWork;
use stanza_shared::AppError;

/// Logs a persistence failure and returns the sanitized error.
///
/// The raw database error text stays in the log; callers only ever see the
/// operation-level message.
pub(crate) fn persistence_error(context: &'static str, err: &DbErr) -> AppError {
    tracing::error!(error = %err, context, "persistence failure");
    AppError::Persistence(context.to_string())
}

/// Rolls the unit of work back and returns the original cause, unless the
/// rollback itself fails - that is its own fatal error, reported instead
/// of the cause it was trying to clean up after.
pub(crate) async fn rollback_then(uow: &mut UnitOfWork, cause: AppError) -> AppError {
    if let Err(rollback_err) = uow.rollback().await {
        tracing::error!(
            error = %rollback_err,
            cause = %cause,
            "rollback failed after aborted operation"
        );
        return AppError::FatalTransaction(
            "Rollback failed after an aborted operation".to_string(),
        );
    }
    cause
}
