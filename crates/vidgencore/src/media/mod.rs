//! Asset pipeline: download, integrity checks, merge, temp-file cleanup.

pub mod fetch;
pub mod merge;
pub mod temp;

pub use fetch::{assert_non_empty, download_to_file};
pub use merge::merge_audio_image;
pub use temp::TempArtifacts;
