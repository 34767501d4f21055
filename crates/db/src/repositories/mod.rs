//! Named-query repositories.
//!
//! Each repository exposes a small set of explicit queries for one entity
//! and returns plain models. Reads accept any connection so the same query
//! can run on the pool or inside an open unit of work; writes take the
//! transaction explicitly.

pub mod customer;
pub mod ledger;
pub mod payment;
pub mod reservation;
pub mod room;

pub use customer::CustomerRepository;
pub use ledger::LedgerEntryRepository;
pub use payment::PaymentRepository;
pub use reservation::ReservationRepository;
pub use room::RoomRepository;
