//! SQL DDL for initializing the paste storage.

/// SQLite schema with:
/// - `id` TEXT PRIMARY KEY, the public paste id
/// - `created_at` / `updated_at` / `expires_at` as unix seconds
/// - `expires_at` NULL for permanent pastes, indexed for the purge sweep
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS pastes (
    id TEXT PRIMARY KEY NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    expires_at INTEGER NULL
);

CREATE INDEX IF NOT EXISTS idx_pastes_expires_at ON pastes(expires_at);
"#;
