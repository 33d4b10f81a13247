use crate::error::PasteError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADMIN_PIN: &str = "0000";
pub const CONFIG_PATH_ENV: &str = "PASTEBIN_CONFIG";
pub const ENV_PREFIX: &str = "PASTEBIN_";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1/";

/// Unprefixed variables shared with the front-end deployment, mapped to their
/// location in [`Config`]. Later rows win, so `REDIS_URL` beats `KV_URL`.
const LEGACY_ENV: &[(&str, &str, &str)] = &[
    ("ADMIN_PIN", "basic", "admin_pin"),
    ("UPSTASH_REDIS_REST_URL", "storage", "upstash_redis_rest_url"),
    ("UPSTASH_REDIS_REST_TOKEN", "storage", "upstash_redis_rest_token"),
    ("KV_URL", "storage", "redis_url"),
    ("REDIS_URL", "storage", "redis_url"),
];

/// Prefixed secrets kept out of figment's value parsing, which would turn
/// `0012` into the number 12.
const RAW_PREFIXED_ENV: &[(&str, &str, &str)] = &[
    ("PASTEBIN_BASIC__ADMIN_PIN", "basic", "admin_pin"),
    ("PASTEBIN_BASIC__COOKIE_SECRET", "basic", "cookie_secret"),
    (
        "PASTEBIN_STORAGE__UPSTASH_REDIS_REST_TOKEN",
        "storage",
        "upstash_redis_rest_token",
    ),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    #[serde(deserialize_with = "string_or_number")]
    pub admin_pin: String,
    /// At least 64 bytes; a random key is generated per process when unset.
    pub cookie_secret: Option<String>,
    pub insecure_cookie: bool,
    pub session_ttl_secs: u64,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            admin_pin: DEFAULT_ADMIN_PIN.to_string(),
            cookie_secret: None,
            insecure_cookie: false,
            session_ttl_secs: 12 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Upstash,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Option<StorageBackend>,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub upstash_redis_rest_url: Option<String>,
    pub upstash_redis_rest_token: Option<String>,
    pub key_prefix: String,
    pub purge_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: None,
            database_url: "sqlite:pastes.db".to_string(),
            redis_url: None,
            upstash_redis_rest_url: None,
            upstash_redis_rest_token: None,
            key_prefix: String::new(),
            purge_interval_secs: 60,
        }
    }
}

impl StorageConfig {
    /// Explicit backend wins; then a Redis URL; then Upstash once both REST
    /// credentials are present.
    pub fn resolved_backend(&self) -> StorageBackend {
        match self.backend {
            Some(backend) => backend,
            None if self.redis_url.is_some() => StorageBackend::Redis,
            None if self.upstash_redis_rest_url.is_some()
                && self.upstash_redis_rest_token.is_some() =>
            {
                StorageBackend::Upstash
            }
            None => StorageBackend::Sqlite,
        }
    }

    pub fn redis_url_or_default(&self) -> &str {
        self.redis_url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_body_bytes: usize,
    pub pin_attempts_per_minute: u32,
    pub lockout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
            pin_attempts_per_minute: 10,
            lockout_secs: 300,
        }
    }
}

impl Config {
    /// Layered sources: defaults, TOML file, legacy env vars, prefixed env vars
    /// (secrets among them read verbatim).
    pub fn figment() -> Figment {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let raw_keys: Vec<&str> = RAW_PREFIXED_ENV
            .iter()
            .map(|&(var, _, _)| var.strip_prefix(ENV_PREFIX).unwrap_or(var))
            .collect();

        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Serialized::defaults(env_overlay(LEGACY_ENV)))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&raw_keys).split("__"))
            .merge(Serialized::defaults(env_overlay(RAW_PREFIXED_ENV)))
    }

    pub fn load() -> Result<Self, PasteError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, PasteError> {
        let cfg: Config = figment
            .extract()
            .map_err(|e| PasteError::Config(e.to_string()))?;
        cfg.normalized()
    }

    fn normalized(mut self) -> Result<Self, PasteError> {
        if self.basic.admin_pin.is_empty() {
            self.basic.admin_pin = DEFAULT_ADMIN_PIN.to_string();
        }
        let storage = &mut self.storage;
        storage.redis_url = non_empty(storage.redis_url.take());
        storage.upstash_redis_rest_url = non_empty(storage.upstash_redis_rest_url.take());
        storage.upstash_redis_rest_token = non_empty(storage.upstash_redis_rest_token.take());
        self.basic.cookie_secret = non_empty(self.basic.cookie_secret.take());

        if let Some(secret) = &self.basic.cookie_secret
            && secret.len() < 64
        {
            return Err(PasteError::Config(
                "basic.cookie_secret must be at least 64 bytes".to_string(),
            ));
        }
        if self
            .storage
            .key_prefix
            .chars()
            .any(|c| matches!(c, '*' | '?' | '[' | ']') || c.is_whitespace())
        {
            return Err(PasteError::Config(
                "storage.key_prefix must not contain glob characters or whitespace".to_string(),
            ));
        }
        if self.limits.pin_attempts_per_minute == 0 {
            return Err(PasteError::Config(
                "limits.pin_attempts_per_minute must be positive".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.basic.session_ttl_secs)
    }

    pub fn lockout(&self) -> Duration {
        Duration::from_secs(self.limits.lockout_secs)
    }
}

/// Reads `vars` verbatim so PINs such as `0012` keep their leading zeros.
fn env_overlay(vars: &[(&str, &str, &str)]) -> Value {
    let mut root = Map::new();
    for (var, section, field) in vars {
        let Ok(value) = std::env::var(var) else {
            continue;
        };
        let entry = root
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(section) = entry {
            section.insert(field.to_string(), Value::String(value));
        }
    }
    Value::Object(root)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
    })
}
