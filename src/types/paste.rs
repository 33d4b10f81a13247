use crate::service::paste_store::PasteEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreatePaste {
    pub content: String,
    #[serde(default)]
    pub filename: Option<String>,
    /// Seconds; `0`, negative or absent keeps the paste forever.
    #[serde(default)]
    pub ttl: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaste {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub ttl: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub pin: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct PasteSaved {
    pub success: bool,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct PasteList {
    pub success: bool,
    pub files: Vec<PasteEntry>,
}
