pub mod janitor;
pub mod paste_store;

pub use paste_store::{PasteEntry, PasteStorage};
