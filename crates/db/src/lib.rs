//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Named-query repositories for data access
//! - Database migrations
//! - The unit-of-work transaction boundary

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod unit_of_work;

pub use repositories::{
    CustomerRepository, LedgerEntryRepository, PaymentRepository, ReservationRepository,
    RoomRepository,
};
pub use unit_of_work::{UnitOfWork, UowError};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
