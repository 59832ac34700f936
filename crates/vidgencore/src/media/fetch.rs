//! Streaming HTTP download of request assets (cover image, direct audio).

use futures_util::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::core::error::{AppError, AppResult};

/// Downloads `url` to `dest`, streaming chunks to disk.
pub async fn download_to_file(http: &reqwest::Client, url: &str, dest: &Path) -> AppResult<()> {
    let response = http.get(url).send().await?;
    if !response.status().is_success() {
        return Err(AppError::HttpStatus(response.status()));
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    log::debug!("fetched {} -> {}", url, dest.display());
    Ok(())
}

/// Integrity check: the file must exist and be non-empty. Returns its size.
pub fn assert_non_empty(path: &Path, what: &str) -> AppResult<u64> {
    let meta = fs_err::metadata(path).map_err(|_| AppError::Asset(format!("{} missing: {}", what, path.display())))?;
    if meta.len() == 0 {
        return Err(AppError::Asset(format!("{} is empty: {}", what, path.display())));
    }
    Ok(meta.len())
}
