//! Telegram integration: bot construction, commands, handlers, state.

pub mod bot;
pub mod handlers;
pub mod state;

pub use bot::{create_bot, Bot, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
