use crate::error::PasteError;
use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

/// `Json<T>` whose rejections use the service's error body, so oversized
/// uploads surface as 413 and malformed payloads as 400.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = PasteError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(map_rejection(rejection)),
        }
    }
}

fn map_rejection(rejection: JsonRejection) -> PasteError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return PasteError::PayloadTooLarge;
    }
    PasteError::BadRequest(rejection.body_text())
}
