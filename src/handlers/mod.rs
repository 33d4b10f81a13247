pub mod admin;
pub mod paste;
pub mod site;
