use crate::service::paste_store::{PERMANENT_TTL, PasteEntry};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct PasteRow {
    pub id: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub expires_at: Option<i64>,
}

impl PasteRow {
    /// Remaining lifetime in seconds at `now`, or `-1` for permanent rows.
    pub fn ttl_at(&self, now: i64) -> i64 {
        match self.expires_at {
            Some(at) => (at - now).max(0),
            None => PERMANENT_TTL,
        }
    }

    pub fn to_entry(&self, now: i64) -> PasteEntry {
        PasteEntry {
            id: self.id.clone(),
            key: self.id.clone(),
            ttl: self.ttl_at(now),
        }
    }
}
