//! Vidgen core — turns a song reference (free text, a streaming-service
//! link, or a direct URL) into a resolved audio track plus cover art, and
//! merges the two into a still-image MP4.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging
//! - `resolve`: the multi-source track-resolution pipeline and cover lookup
//! - `media`: asset download, integrity checks, ffmpeg merge, temp cleanup
//! - `lock`: per-chat request serialization

pub mod core;
pub mod lock;
pub mod media;
pub mod resolve;

// Re-export commonly used types for convenience
pub use crate::core::{config, error::AppError, error::AppResult};
pub use lock::ChatLocks;
pub use resolve::{CoverResolver, ResolveOutcome, ResolvedTrack, Resolver, SourceId};
