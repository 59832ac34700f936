//! Request-scoped temp paths with cleanup on every exit path.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::config;

/// The three on-disk artifacts of one request: downloaded audio, cover
/// image, and muxed output. Created with unique names so overlapping
/// requests from different chats never collide; all three are deleted
/// when the set is dropped, success or not, so a long-lived process
/// cannot accumulate temp files.
pub struct TempArtifacts {
    pub audio: PathBuf,
    pub cover: PathBuf,
    pub output: PathBuf,
}

impl TempArtifacts {
    pub fn new() -> Self {
        Self::new_in(Path::new(config::TEMP_FILES_DIR.as_str()))
    }

    pub fn new_in(dir: &Path) -> Self {
        let id = Uuid::new_v4();
        Self {
            audio: dir.join(format!("audio_{}.mp3", id)),
            cover: dir.join(format!("cover_{}.jpg", id)),
            output: dir.join(format!("output_{}.mp4", id)),
        }
    }
}

impl Default for TempArtifacts {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        for path in [&self.audio, &self.cover, &self.output] {
            if path.exists() {
                if let Err(e) = fs_err::remove_file(path) {
                    log::warn!("temp cleanup failed for {}: {}", path.display(), e);
                }
            }
        }
    }
}
