//! Database module: SQLite and native Redis paste storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: queries against the `pastes` table
//! - `redis_kv.rs`: one string key per paste on a Redis server

pub mod models;
pub mod redis_kv;
pub mod schema;
pub mod sqlite;

pub use redis_kv::RedisPasteStorage;
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePasteStorage, SqlitePool};
