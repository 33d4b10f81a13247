use crate::error::PasteError;
use crate::service::paste_store::{MISSING_TTL, PasteEntry};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tracing::warn;

/// Pastes kept on a Redis server, one string key per paste.
///
/// Speaks the same commands as the Upstash REST path (`SET [EX]`, `GET`,
/// `DEL`, `KEYS`, `TTL`) over a multiplexed connection.
#[derive(Clone)]
pub struct RedisPasteStorage {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisPasteStorage {
    pub fn new(conn: MultiplexedConnection, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    /// Open `redis://` or `rediss://` and verify the server answers.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, PasteError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self::new(conn, prefix))
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    pub async fn put(
        &self,
        id: &str,
        content: &str,
        ttl: Option<Duration>,
    ) -> Result<(), PasteError> {
        let mut conn = self.conn.clone();
        let key = self.key(id);
        match ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, content, ttl.as_secs()).await?,
            None => conn.set::<_, _, ()>(key, content).await?,
        }
        Ok(())
    }

    /// A key holding something other than a string reads as missing.
    pub async fn get(&self, id: &str) -> Result<Option<String>, PasteError> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(self.key(id)).await {
            Ok(value) => Ok(value),
            Err(e) if e.code() == Some("WRONGTYPE") => {
                warn!(id, "paste key holds a non-string value");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(&self) -> Result<Vec<PasteEntry>, PasteError> {
        let mut conn = self.conn.clone();
        let mut keys: Vec<String> = conn.keys(format!("{}*", self.prefix)).await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        keys.sort();

        let mut pipe = redis::pipe();
        for key in &keys {
            pipe.cmd("TTL").arg(key);
        }
        let ttls: Vec<i64> = pipe.query_async(&mut conn).await?;

        Ok(keys
            .into_iter()
            .zip(ttls.into_iter().chain(std::iter::repeat(MISSING_TTL)))
            .map(|(key, ttl)| PasteEntry {
                id: key
                    .strip_prefix(self.prefix.as_str())
                    .unwrap_or(&key)
                    .to_string(),
                ttl,
                key,
            })
            .collect())
    }

    pub async fn delete(&self, id: &str) -> Result<bool, PasteError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(self.key(id)).await?;
        Ok(removed > 0)
    }
}
