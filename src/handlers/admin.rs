use crate::error::PasteError;
use crate::middleware::JsonBody;
use crate::middleware::auth::{clear_session_cookie, session_cookie, session_is_valid};
use crate::server::router::PasteState;
use crate::types::paste::VerifyRequest;
use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde_json::json;
use tracing::{info, warn};

/// POST /api/verify -> checks the admin PIN and opens a cookie session.
pub async fn verify_pin(
    State(state): State<PasteState>,
    jar: PrivateCookieJar,
    JsonBody(payload): JsonBody<VerifyRequest>,
) -> Result<impl IntoResponse, PasteError> {
    if let Err(e) = state.guard.verify(&payload.pin) {
        warn!(error = %e, "admin PIN rejected");
        return Err(e);
    }
    info!("admin PIN verified; session issued");
    let jar = jar.add(session_cookie(state.session, state.sessions.current()));
    Ok((jar, Json(json!({ "success": true }))))
}

/// POST /api/logout -> revokes outstanding sessions and drops the cookie.
///
/// Only a caller holding a live session can revoke; anyone else just gets the
/// cookie cleared.
pub async fn logout(State(state): State<PasteState>, jar: PrivateCookieJar) -> impl IntoResponse {
    if session_is_valid(&jar, state.session.ttl, state.sessions.current()) {
        let generation = state.sessions.revoke_all();
        info!(generation, "admin sessions revoked");
    }
    (jar.remove(clear_session_cookie()), Json(json!({ "success": true })))
}
