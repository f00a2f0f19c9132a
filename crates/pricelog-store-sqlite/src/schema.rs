//! SQL schema for the pricelog SQLite store.
//!
//! Executed on every connection open. Idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`; there are no migrations.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Names are compared case-sensitively (BINARY collation).
CREATE TABLE IF NOT EXISTS cities (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL UNIQUE
);

-- Ids come from the price lists, never from the store.
CREATE TABLE IF NOT EXISTS products (
    id    INTEGER PRIMARY KEY,
    name  TEXT
);

-- Observation tables are append-only.
-- A row is added only when the value differs from the newest one.
CREATE TABLE IF NOT EXISTS price_observations (
    product_id  INTEGER NOT NULL REFERENCES products(id)
                ON UPDATE CASCADE ON DELETE CASCADE,
    city_id     INTEGER NOT NULL REFERENCES cities(id)
                ON UPDATE CASCADE ON DELETE CASCADE,
    price       INTEGER NOT NULL,
    observed_at TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    UNIQUE (product_id, city_id, observed_at)
);

CREATE TABLE IF NOT EXISTS bonus_observations (
    product_id  INTEGER NOT NULL REFERENCES products(id)
                ON UPDATE CASCADE ON DELETE CASCADE,
    city_id     INTEGER NOT NULL REFERENCES cities(id)
                ON UPDATE CASCADE ON DELETE CASCADE,
    bonus       INTEGER NOT NULL,
    observed_at TEXT NOT NULL,
    UNIQUE (product_id, city_id, observed_at)
);

CREATE INDEX IF NOT EXISTS price_observations_city_idx ON price_observations(city_id);
CREATE INDEX IF NOT EXISTS bonus_observations_city_idx ON bonus_observations(city_id);
";
