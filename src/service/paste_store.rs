use crate::api::upstash_api::UpstashApi;
use crate::config::{StorageBackend, StorageConfig};
use crate::db::redis_kv::RedisPasteStorage;
use crate::db::sqlite::SqlitePasteStorage;
use crate::error::PasteError;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// TTL reported for pastes without expiry.
pub const PERMANENT_TTL: i64 = -1;
/// TTL reported when a listed key vanished before its TTL was read.
pub const MISSING_TTL: i64 = -2;
pub const MAX_ID_LEN: usize = 128;
pub const GENERATED_ID_LEN: usize = 8;

/// One row of the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasteEntry {
    pub id: String,
    pub key: String,
    /// `-1` permanent, otherwise seconds remaining.
    pub ttl: i64,
}

/// Short random id: the first 8 hex digits of a v4 UUID.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(GENERATED_ID_LEN)
        .collect()
}

pub fn validate_id(id: &str) -> Result<(), PasteError> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(PasteError::InvalidId(format!(
            "id must be 1..={MAX_ID_LEN} bytes"
        )));
    }
    if let Some(bad) = id.chars().find(|c| {
        c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\' | '*' | '?' | '[' | ']')
    }) {
        return Err(PasteError::InvalidId(format!(
            "id contains forbidden character {bad:?}"
        )));
    }
    Ok(())
}

/// Use a non-blank filename as the id, otherwise mint one.
pub fn resolve_id(filename: Option<&str>) -> Result<String, PasteError> {
    match filename.map(str::trim) {
        Some(name) if !name.is_empty() => {
            validate_id(name)?;
            Ok(name.to_string())
        }
        _ => Ok(generate_id()),
    }
}

/// `None` or non-positive means the paste never expires.
pub fn ttl_from_secs(ttl: Option<i64>) -> Option<Duration> {
    match ttl {
        Some(secs) if secs > 0 => Some(Duration::from_secs(secs as u64)),
        _ => None,
    }
}

/// Pastes kept in an Upstash Redis database, one string key per paste.
#[derive(Clone)]
pub struct UpstashPasteStorage {
    api: UpstashApi,
    prefix: String,
}

impl UpstashPasteStorage {
    pub fn new(api: UpstashApi, prefix: impl Into<String>) -> Self {
        Self {
            api,
            prefix: prefix.into(),
        }
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
        let key = self.key(id);
        match ttl {
            Some(ttl) => {
                let secs = ttl.as_secs().to_string();
                self.api
                    .command(&["SET", key.as_str(), content, "EX", secs.as_str()])
                    .await?
            }
            None => self.api.command(&["SET", key.as_str(), content]).await?,
        };
        Ok(())
    }

    /// A key holding something other than a string reads as missing.
    pub async fn get(&self, id: &str) -> Result<Option<String>, PasteError> {
        match self.api.command(&["GET", self.key(id).as_str()]).await {
            Ok(Value::String(s)) => Ok(Some(s)),
            Ok(Value::Null) => Ok(None),
            Ok(other) => {
                warn!(id, reply = %other, "unexpected GET reply; treating paste as missing");
                Ok(None)
            }
            Err(PasteError::Upstash(msg)) if msg.starts_with("WRONGTYPE") => {
                warn!(id, "paste key holds a non-string value");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self) -> Result<Vec<PasteEntry>, PasteError> {
        let pattern = format!("{}*", self.prefix);
        let mut keys: Vec<String> = match self.api.command(&["KEYS", pattern.as_str()]).await? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Value::Null => Vec::new(),
            other => {
                return Err(PasteError::Upstash(format!(
                    "unexpected KEYS reply: {other}"
                )));
            }
        };
        keys.sort();

        let commands: Vec<Vec<String>> = keys
            .iter()
            .map(|k| vec!["TTL".to_string(), k.clone()])
            .collect();
        let ttls = self.api.pipeline(&commands).await?;

        Ok(keys
            .into_iter()
            .zip(ttls)
            .map(|(key, ttl)| PasteEntry {
                id: key
                    .strip_prefix(self.prefix.as_str())
                    .unwrap_or(&key)
                    .to_string(),
                ttl: ttl.as_i64().unwrap_or(MISSING_TTL),
                key,
            })
            .collect())
    }

    pub async fn delete(&self, id: &str) -> Result<bool, PasteError> {
        let removed = self.api.command(&["DEL", self.key(id).as_str()]).await?;
        Ok(removed.as_i64().unwrap_or(0) > 0)
    }
}

/// Paste storage backed by whichever store the configuration selects.
#[derive(Clone)]
pub enum PasteStorage {
    Sqlite(SqlitePasteStorage),
    Upstash(UpstashPasteStorage),
    Redis(RedisPasteStorage),
}

impl PasteStorage {
    pub async fn connect(cfg: &StorageConfig) -> Result<Self, PasteError> {
        match cfg.resolved_backend() {
            StorageBackend::Sqlite => {
                info!(database_url = %cfg.database_url, "using SQLite paste storage");
                let storage = SqlitePasteStorage::connect(&cfg.database_url).await?;
                Ok(Self::Sqlite(storage))
            }
            StorageBackend::Upstash => {
                let (Some(url), Some(token)) = (
                    cfg.upstash_redis_rest_url.as_deref(),
                    cfg.upstash_redis_rest_token.as_deref(),
                ) else {
                    return Err(PasteError::Config(
                        "upstash backend needs UPSTASH_REDIS_REST_URL and UPSTASH_REDIS_REST_TOKEN"
                            .to_string(),
                    ));
                };
                let url = Url::parse(url)?;
                info!(host = %url.host_str().unwrap_or("-"), "using Upstash paste storage");
                let api = UpstashApi::new(url, token)?;
                Ok(Self::Upstash(UpstashPasteStorage::new(
                    api,
                    cfg.key_prefix.clone(),
                )))
            }
            StorageBackend::Redis => {
                let url = cfg.redis_url_or_default();
                let host = Url::parse(url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
                    .unwrap_or_else(|| "-".to_string());
                info!(%host, "using Redis paste storage");
                let storage = RedisPasteStorage::connect(url, cfg.key_prefix.clone()).await?;
                Ok(Self::Redis(storage))
            }
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            Self::Sqlite(_) => StorageBackend::Sqlite,
            Self::Upstash(_) => StorageBackend::Upstash,
            Self::Redis(_) => StorageBackend::Redis,
        }
    }

    pub async fn put(
        &self,
        id: &str,
        content: &str,
        ttl: Option<Duration>,
    ) -> Result<(), PasteError> {
        match self {
            Self::Sqlite(s) => s.put(id, content, ttl).await,
            Self::Upstash(s) => s.put(id, content, ttl).await,
            Self::Redis(s) => s.put(id, content, ttl).await,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<String>, PasteError> {
        match self {
            Self::Sqlite(s) => s.get(id).await,
            Self::Upstash(s) => s.get(id).await,
            Self::Redis(s) => s.get(id).await,
        }
    }

    pub async fn list(&self) -> Result<Vec<PasteEntry>, PasteError> {
        match self {
            Self::Sqlite(s) => s.list().await,
            Self::Upstash(s) => s.list().await,
            Self::Redis(s) => s.list().await,
        }
    }

    pub async fn delete(&self, id: &str) -> Result<bool, PasteError> {
        match self {
            Self::Sqlite(s) => s.delete(id).await,
            Self::Upstash(s) => s.delete(id).await,
            Self::Redis(s) => s.delete(id).await,
        }
    }

    /// Redis expires keys itself, so only SQLite has anything to sweep.
    pub async fn purge_expired(&self) -> Result<u64, PasteError> {
        match self {
            Self::Sqlite(s) => s.purge_expired().await,
            Self::Upstash(_) | Self::Redis(_) => Ok(0),
        }
    }
}
