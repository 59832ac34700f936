//! ffmpeg mux of a still cover image and an audio track into an MP4.

use std::path::Path;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::core::config;
use crate::core::error::{AppError, AppResult};

/// Merges `image` + `audio` into `output`.
///
/// Encodes at 1 fps with the still-image tune — the video stream is a
/// single looped frame, so anything more is wasted bitrate. Width is
/// capped at 1280 with the height forced even (libx264 requirement).
pub async fn merge_audio_image(image: &Path, audio: &Path, output: &Path) -> AppResult<()> {
    log::info!(
        "merge: {} + {} -> {}",
        image.display(),
        audio.display(),
        output.display()
    );

    let image_path = image.to_string_lossy().to_string();
    let audio_path = audio.to_string_lossy().to_string();
    let output_path = output.to_string_lossy().to_string();

    let args = [
        "-y",
        "-loop",
        "1",
        "-i",
        image_path.as_str(),
        "-i",
        audio_path.as_str(),
        "-c:v",
        "libx264",
        "-preset",
        "ultrafast",
        "-tune",
        "stillimage",
        "-c:a",
        "aac",
        "-b:a",
        "128k",
        "-pix_fmt",
        "yuv420p",
        "-r",
        "1",
        "-vf",
        "scale='min(1280,iw)':-2",
        "-shortest",
        output_path.as_str(),
    ];

    let result = timeout(config::merge::timeout(), TokioCommand::new("ffmpeg").args(&args).output())
        .await
        .map_err(|_| AppError::Merge("ffmpeg timed out".to_string()))?
        .map_err(|e| AppError::Merge(format!("failed to run ffmpeg: {}", e)))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(AppError::Merge(format!(
            "ffmpeg failed (exit {:?}): {}",
            result.status.code(),
            stderr.trim()
        )));
    }

    log::info!("merge: finished {}", output.display());
    Ok(())
}
