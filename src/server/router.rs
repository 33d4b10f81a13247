use crate::config::Config;
use crate::error::PasteError;
use crate::handlers::admin::{logout, verify_pin};
use crate::handlers::paste::{create_paste, delete_paste, get_paste, list_pastes, update_paste};
use crate::handlers::site::{root_handler, site_manifest};
use crate::middleware::{PinGuard, SessionGeneration, SessionSettings};
use crate::service::paste_store::PasteStorage;
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct PasteState {
    pub storage: PasteStorage,
    pub guard: Arc<PinGuard>,
    pub session: SessionSettings,
    pub sessions: Arc<SessionGeneration>,
    pub cookie_key: Key,
    pub max_body_bytes: usize,
}

impl PasteState {
    pub fn new(storage: PasteStorage, cfg: &Config) -> Result<Self, PasteError> {
        let attempts = NonZeroU32::new(cfg.limits.pin_attempts_per_minute).ok_or_else(|| {
            PasteError::Config("limits.pin_attempts_per_minute must be positive".to_string())
        })?;
        let cookie_key = match cfg.basic.cookie_secret.as_deref() {
            Some(secret) => Key::try_from(secret.as_bytes())
                .map_err(|e| PasteError::Config(format!("basic.cookie_secret: {e}")))?,
            None => {
                warn!("no cookie_secret configured; admin sessions end on restart");
                Key::generate()
            }
        };

        Ok(Self {
            storage,
            guard: Arc::new(PinGuard::new(
                cfg.basic.admin_pin.clone(),
                attempts,
                cfg.lockout(),
            )),
            session: SessionSettings {
                ttl: cfg.session_ttl(),
                insecure_cookie: cfg.basic.insecure_cookie,
            },
            sessions: Arc::new(SessionGeneration::default()),
            cookie_key,
            max_body_bytes: cfg.limits.max_body_bytes,
        })
    }
}

impl FromRef<PasteState> for Key {
    fn from_ref(state: &PasteState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn paste_router(state: PasteState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/", get(root_handler))
        .route("/api/main", get(root_handler))
        .route("/api/site", get(site_manifest))
        .route("/api/verify", post(verify_pin))
        .route("/api/logout", post(logout))
        .route("/api/upload", post(create_paste))
        .route("/api/update", post(update_paste))
        .route("/api/list", get(list_pastes))
        .route("/api/delete", post(delete_paste))
        .route("/raw/{id}", get(get_paste))
        .route("/paste/{id}", get(get_paste))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
