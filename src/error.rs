use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum PasteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Upstash error: {0}")]
    Upstash(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid PIN")]
    InvalidPin,

    #[error("Admin authentication required")]
    Unauthorized,

    #[error("Too many failed PIN attempts")]
    TooManyAttempts,

    #[error("Paste not found")]
    NotFound,

    #[error("Invalid paste id: {0}")]
    InvalidId(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,
}

impl PasteError {
    /// Transport failures and 5xx answers from Upstash are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            PasteError::Reqwest(e) => {
                e.is_connect()
                    || e.is_timeout()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            _ => false,
        }
    }
}

impl IntoResponse for PasteError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            PasteError::InvalidPin => (StatusCode::UNAUTHORIZED, "INVALID_PIN", self.to_string()),
            PasteError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            PasteError::TooManyAttempts => (
                StatusCode::TOO_MANY_REQUESTS,
                "TOO_MANY_ATTEMPTS",
                self.to_string(),
            ),
            PasteError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            PasteError::InvalidId(_) | PasteError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", self.to_string())
            }
            PasteError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
            PasteError::Upstash(_)
            | PasteError::Redis(_)
            | PasteError::Reqwest(_)
            | PasteError::UrlParse(_) => {
                error!(error = %self, "storage backend request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "BAD_GATEWAY",
                    "Storage backend is unavailable.".to_string(),
                )
            }
            PasteError::Config(_)
            | PasteError::Json(_)
            | PasteError::Io(_)
            | PasteError::Database(_) => {
                error!(error = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        let body = ApiErrorResponse {
            success: false,
            code: code.to_string(),
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub code: String,
    pub error: String,
}
