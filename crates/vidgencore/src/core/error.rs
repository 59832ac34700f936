use thiserror::Error;

/// Centralized error types for the application
///
/// Only errors that are fatal for the current request live here. Provider
/// failures (timeouts, bad JSON, non-2xx) never surface as errors — each
/// adapter degrades to "no candidate" and the fallback chain advances.
#[derive(Error, Debug)]
pub enum AppError {
    /// A streaming-service link whose page metadata could not be read.
    /// Fatal: without the page title there is nothing to search for.
    #[error("Could not read link metadata: {0}")]
    LinkMetadata(String),

    /// Normalization produced an empty track name; resolution must not start
    #[error("Empty query after normalization")]
    EmptyQuery,

    /// A downloaded asset is missing or zero-byte
    #[error("Asset error: {0}")]
    Asset(String),

    /// The ffmpeg merge failed or timed out
    #[error("Merge error: {0}")]
    Merge(String),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
