//! Core utilities: configuration, error types, logging setup.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{AppError, AppResult};
pub use logging::init_logger;
