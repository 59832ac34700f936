//! Telegram update handlers.

pub mod audio;
pub mod commands;
pub mod manual;
pub mod schema;
pub mod search;
pub mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError, HandlerResult};
