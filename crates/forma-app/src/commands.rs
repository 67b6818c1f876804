//! Subcommand implementations.

mod catalog;
mod chat;
mod generate;

pub use catalog::{list, rename, show};
pub use chat::chat;
pub use generate::generate;
