use crate::error::PasteError;
use crate::server::router::PasteState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use chrono::Utc;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use headers::{Authorization, HeaderMapExt, authorization::Bearer};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

pub const SESSION_COOKIE: &str = "admin_session";
pub const PIN_HEADER: &str = "x-admin-pin";

/// Holds the admin PIN and throttles guessing.
///
/// Every failed attempt draws from a per-minute quota; once it runs dry all
/// checks fail with [`PasteError::TooManyAttempts`] until the lockout ends,
/// including checks that carry the right PIN.
pub struct PinGuard {
    pin: String,
    failures: DefaultDirectRateLimiter,
    lockout: Duration,
    locked_until: Mutex<Option<Instant>>,
}

impl PinGuard {
    pub fn new(pin: impl Into<String>, attempts_per_minute: NonZeroU32, lockout: Duration) -> Self {
        Self {
            pin: pin.into(),
            failures: RateLimiter::direct(Quota::per_minute(attempts_per_minute)),
            lockout,
            locked_until: Mutex::new(None),
        }
    }

    pub fn verify(&self, candidate: &str) -> Result<(), PasteError> {
        if self.is_locked() {
            return Err(PasteError::TooManyAttempts);
        }
        if bool::from(candidate.as_bytes().ct_eq(self.pin.as_bytes())) {
            return Ok(());
        }
        if self.failures.check().is_err() {
            warn!(lockout_secs = self.lockout.as_secs(), "too many failed PIN attempts; locking");
            *self.lock_state() = Some(Instant::now() + self.lockout);
            return Err(PasteError::TooManyAttempts);
        }
        Err(PasteError::InvalidPin)
    }

    pub fn is_locked(&self) -> bool {
        let mut state = self.lock_state();
        let current = *state;
        match current {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                *state = None;
                false
            }
            None => false,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.locked_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Server-side session generation. Cookies carry the generation they were
/// issued under; bumping it on logout invalidates every outstanding cookie.
/// Held in memory, so a restart starts over at zero.
#[derive(Debug, Default)]
pub struct SessionGeneration(AtomicU64);

impl SessionGeneration {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Returns the new generation.
    pub fn revoke_all(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Session cookie lifetime and transport flags.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub ttl: Duration,
    pub insecure_cookie: bool,
}

/// Encrypted cookie carrying `<generation>:<issued unix seconds>`.
pub fn session_cookie(settings: SessionSettings, generation: u64) -> Cookie<'static> {
    Cookie::build(Cookie::new(
        SESSION_COOKIE,
        format!("{generation}:{}", Utc::now().timestamp()),
    ))
    .path("/")
    .http_only(true)
    .secure(!settings.insecure_cookie)
    .same_site(SameSite::Lax)
    .max_age(time::Duration::seconds(settings.ttl.as_secs() as i64))
    .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn session_is_valid(jar: &PrivateCookieJar, ttl: Duration, generation: u64) -> bool {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return false;
    };
    let Some((minted, issued)) = cookie.value().split_once(':') else {
        return false;
    };
    let (Ok(minted), Ok(issued)) = (minted.parse::<u64>(), issued.parse::<i64>()) else {
        return false;
    };
    if minted != generation {
        return false;
    }
    let age = Utc::now().timestamp() - issued;
    age >= 0 && (age as u64) < ttl.as_secs()
}

/// Pull a PIN from `x-admin-pin` or `Authorization: Bearer`.
fn presented_pin(parts: &Parts) -> Option<String> {
    if let Some(pin) = parts.headers.get(PIN_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(pin.trim().to_string());
    }
    parts
        .headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Extractor guarding admin routes.
/// Accepts either:
/// - a valid `admin_session` private cookie issued by `/api/verify`
/// - Header: `x-admin-pin: <pin>`
/// - Header: `Authorization: Bearer <pin>`
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<PasteState> for RequireAdmin {
    type Rejection = PasteError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PasteState,
    ) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        if session_is_valid(&jar, state.session.ttl, state.sessions.current()) {
            debug!("admin request authorized by session cookie");
            return Ok(Self);
        }

        match presented_pin(parts) {
            Some(pin) => state.guard.verify(&pin).map(|_| Self).map_err(|e| match e {
                PasteError::InvalidPin => PasteError::Unauthorized,
                other => other,
            }),
            None => Err(PasteError::Unauthorized),
        }
    }
}
