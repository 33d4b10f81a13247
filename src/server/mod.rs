pub mod router;

pub use router::{PasteState, paste_router};
