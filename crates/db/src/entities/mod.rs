//! `SeaORM` entity definitions.

pub mod customers;
pub mod ledger_entries;
pub mod payment_methods;
pub mod payments;
pub mod reservations;
pub mod room_statuses;
pub mod rooms;
pub mod sea_orm_active_enums;
