use crate::error::PasteError;
use crate::middleware::{JsonBody, RequireAdmin};
use crate::server::router::PasteState;
use crate::service::paste_store::{resolve_id, ttl_from_secs, validate_id};
use crate::types::paste::{CreatePaste, DeleteRequest, PasteList, PasteSaved, UpdatePaste};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;

/// POST /api/upload -> stores a paste under `filename` or a generated id.
pub async fn create_paste(
    State(state): State<PasteState>,
    _admin: RequireAdmin,
    JsonBody(payload): JsonBody<CreatePaste>,
) -> Result<impl IntoResponse, PasteError> {
    let id = resolve_id(payload.filename.as_deref())?;
    let ttl = ttl_from_secs(payload.ttl);

    state.storage.put(&id, &payload.content, ttl).await?;

    info!(id = %id, bytes = payload.content.len(), ttl = ?ttl, "paste created");
    Ok((StatusCode::CREATED, Json(PasteSaved { success: true, id })))
}

/// POST /api/update -> overwrites content and TTL of `id`.
pub async fn update_paste(
    State(state): State<PasteState>,
    _admin: RequireAdmin,
    JsonBody(payload): JsonBody<UpdatePaste>,
) -> Result<Json<PasteSaved>, PasteError> {
    validate_id(&payload.id)?;
    let ttl = ttl_from_secs(payload.ttl);

    state.storage.put(&payload.id, &payload.content, ttl).await?;

    info!(id = %payload.id, ttl = ?ttl, "paste updated");
    Ok(Json(PasteSaved {
        success: true,
        id: payload.id,
    }))
}

/// GET /raw/{id}, GET /paste/{id} -> raw paste content.
pub async fn get_paste(
    State(state): State<PasteState>,
    Path(id): Path<String>,
) -> Result<String, PasteError> {
    validate_id(&id).map_err(|_| PasteError::NotFound)?;
    state.storage.get(&id).await?.ok_or(PasteError::NotFound)
}

/// GET /api/list -> every live paste with its remaining TTL.
pub async fn list_pastes(
    State(state): State<PasteState>,
    _admin: RequireAdmin,
) -> Result<Json<PasteList>, PasteError> {
    let files = state.storage.list().await?;
    Ok(Json(PasteList {
        success: true,
        files,
    }))
}

/// POST /api/delete -> removes `id`; deleting a missing paste still succeeds.
pub async fn delete_paste(
    State(state): State<PasteState>,
    _admin: RequireAdmin,
    JsonBody(payload): JsonBody<DeleteRequest>,
) -> Result<impl IntoResponse, PasteError> {
    validate_id(&payload.id)?;
    let deleted = state.storage.delete(&payload.id).await?;
    info!(id = %payload.id, deleted, "paste delete requested");
    Ok(Json(json!({ "success": true, "deleted": deleted })))
}
