//! SQL schema for the Provenant SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS items (
    item_id        TEXT PRIMARY KEY,
    serial_number  TEXT,
    vin            TEXT,
    category       TEXT NOT NULL,
    brand          TEXT,
    model          TEXT,
    color          TEXT,
    status         TEXT NOT NULL DEFAULT 'active',
    current_owner  TEXT NOT NULL,
    registered_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- Ledger entries are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
-- Identifiers are deliberately NOT unique across items: the same physical
-- object may be registered twice (a loss report and a found report); the
-- cross-match engine exists to detect exactly that.
CREATE TABLE IF NOT EXISTS events (
    event_id     TEXT PRIMARY KEY,
    item_id      TEXT NOT NULL REFERENCES items(item_id),
    event_type   TEXT NOT NULL,   -- discriminant of EventDetails variant
    details_json TEXT NOT NULL,   -- JSON payload (inner data only)
    recorded_at  TEXT NOT NULL,   -- ISO 8601 UTC
    actor_id     TEXT,            -- NULL for system actors
    actor_kind   TEXT NOT NULL    -- 'user' | 'admin' | 'police' | 'system'
);

CREATE INDEX IF NOT EXISTS items_serial_idx   ON items(serial_number);
CREATE INDEX IF NOT EXISTS items_vin_idx      ON items(vin);
CREATE INDEX IF NOT EXISTS items_status_idx   ON items(status);
CREATE INDEX IF NOT EXISTS events_item_idx    ON events(item_id);
CREATE INDEX IF NOT EXISTS events_type_idx    ON events(event_type);
CREATE INDEX IF NOT EXISTS events_recorded_idx ON events(recorded_at);

PRAGMA user_version = 1;
";
