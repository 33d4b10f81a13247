use crate::site::{self, SiteManifest};
use axum::Json;

pub const BANNER: &str = "Pastebin Rust API is Running on Vercel!";

pub async fn root_handler() -> &'static str {
    BANNER
}

/// GET /api/site -> page head, theme and content scan paths for the UI.
pub async fn site_manifest() -> Json<SiteManifest> {
    Json(site::manifest())
}
