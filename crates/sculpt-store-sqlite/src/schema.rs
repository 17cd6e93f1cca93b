//! SQL schema for the Sculpt SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS submissions (
    submission_id  TEXT PRIMARY KEY,
    employee_name  TEXT NOT NULL UNIQUE,
    photo_locator  TEXT,
    model_locator  TEXT,
    status         TEXT NOT NULL DEFAULT 'pending',  -- 'pending' | 'processing' | 'completed'
    created_at     TEXT NOT NULL,                    -- ISO 8601 UTC; server-assigned
    updated_at     TEXT NOT NULL,
    -- A model is always derived from a photo.
    CHECK (model_locator IS NULL OR photo_locator IS NOT NULL)
);

PRAGMA user_version = 1;
";
