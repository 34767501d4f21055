//! Initial database migration.
//!
//! Creates all core tables, the ledger enum, constraints, and seed rows
//! for the reference tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: EXTENSIONS & ENUMS
        // ============================================================
        db.execute_unprepared(EXTENSIONS_SQL).await?;
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: REFERENCE TABLES
        // ============================================================
        db.execute_unprepared(ROOM_STATUSES_SQL).await?;
        db.execute_unprepared(PAYMENT_METHODS_SQL).await?;

        // ============================================================
        // PART 3: CORE TABLES
        // ============================================================
        db.execute_unprepared(ROOMS_SQL).await?;
        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(RESERVATIONS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 4: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_ROOM_STATUSES_SQL).await?;
        db.execute_unprepared(SEED_PAYMENT_METHODS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const EXTENSIONS_SQL: &str = r"
-- Needed for the (room_id, interval) exclusion constraint
CREATE EXTENSION IF NOT EXISTS btree_gist;
";

const ENUMS_SQL: &str = r"
-- Ledger entry kinds; the sign is applied by kind at aggregation time
CREATE TYPE entry_kind AS ENUM ('debt', 'payment', 'refund');
";

const ROOM_STATUSES_SQL: &str = r"
CREATE TABLE room_statuses (
    id          SERIAL PRIMARY KEY,
    status_name TEXT NOT NULL UNIQUE,
    description TEXT
);
";

const PAYMENT_METHODS_SQL: &str = r"
CREATE TABLE payment_methods (
    id          SERIAL PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT
);
";

const ROOMS_SQL: &str = r"
CREATE TABLE rooms (
    id            SERIAL PRIMARY KEY,
    serial_number TEXT NOT NULL UNIQUE,
    description   TEXT,
    status_id     INTEGER NOT NULL REFERENCES room_statuses(id),
    last_updated  TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id           UUID PRIMARY KEY,
    full_name    TEXT NOT NULL,
    phone_number TEXT UNIQUE,
    address      TEXT,
    email        TEXT UNIQUE,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const RESERVATIONS_SQL: &str = r"
CREATE TABLE reservations (
    id                UUID PRIMARY KEY,
    room_id           INTEGER NOT NULL REFERENCES rooms(id),
    customer_id       UUID NOT NULL REFERENCES customers(id),
    start_date        TIMESTAMPTZ NOT NULL,
    end_date          TIMESTAMPTZ NOT NULL,
    delivery_address  TEXT,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
    is_active         BOOLEAN NOT NULL DEFAULT TRUE,
    price             NUMERIC(12, 2) NOT NULL,
    price_description TEXT,

    CONSTRAINT reservations_interval_nonempty CHECK (start_date < end_date),
    CONSTRAINT reservations_price_nonnegative CHECK (price >= 0),

    -- Store-level backstop for the no-overlap invariant: two active
    -- reservations for the same room may never occupy intersecting
    -- half-open intervals, regardless of application-level checks.
    CONSTRAINT reservations_no_overlap EXCLUDE USING gist (
        room_id WITH =,
        tstzrange(start_date, end_date) WITH &&
    ) WHERE (is_active)
);

CREATE INDEX idx_reservations_room_active ON reservations(room_id) WHERE is_active;
CREATE INDEX idx_reservations_customer ON reservations(customer_id);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id                UUID PRIMARY KEY,
    reservation_id    UUID NOT NULL REFERENCES reservations(id) ON DELETE CASCADE,
    amount            NUMERIC(12, 2) NOT NULL,
    payment_date      TIMESTAMPTZ NOT NULL DEFAULT now(),
    payment_method_id INTEGER NOT NULL REFERENCES payment_methods(id),
    is_paid           BOOLEAN NOT NULL DEFAULT FALSE,

    CONSTRAINT payments_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_payments_reservation ON payments(reservation_id);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id             UUID PRIMARY KEY,
    customer_id    UUID NOT NULL REFERENCES customers(id),
    entry_kind     entry_kind NOT NULL,
    amount         NUMERIC(12, 2) NOT NULL,
    entry_date     TIMESTAMPTZ NOT NULL DEFAULT now(),
    description    TEXT,
    -- Provenance links only; the ledger row outlives its origin
    reservation_id UUID REFERENCES reservations(id) ON DELETE SET NULL,
    payment_id     UUID REFERENCES payments(id) ON DELETE SET NULL,

    CONSTRAINT ledger_entries_amount_nonnegative CHECK (amount >= 0)
);

CREATE INDEX idx_ledger_entries_customer ON ledger_entries(customer_id);
";

const SEED_ROOM_STATUSES_SQL: &str = r"
INSERT INTO room_statuses (status_name, description) VALUES
    ('Available',    'Room can be reserved'),
    ('Reserved',     'Room is currently reserved'),
    ('Maintenance',  'Room is under maintenance'),
    ('OutOfService', 'Room is out of service');
";

const SEED_PAYMENT_METHODS_SQL: &str = r"
INSERT INTO payment_methods (name, description) VALUES
    ('Cash',         NULL),
    ('CreditCard',   NULL),
    ('BankTransfer', NULL);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledger_entries;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS reservations;
DROP TABLE IF EXISTS customers;
DROP TABLE IF EXISTS rooms;
DROP TABLE IF EXISTS payment_methods;
DROP TABLE IF EXISTS room_statuses;
DROP TYPE IF EXISTS entry_kind;
";
