pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod service;
pub mod site;
pub mod types;

pub use error::PasteError;
pub use service::paste_store::PasteStorage;
