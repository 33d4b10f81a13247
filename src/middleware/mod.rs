pub mod auth;
pub mod json_body;

pub use auth::{PinGuard, RequireAdmin, SessionGeneration, SessionSettings};
pub use json_body::JsonBody;
