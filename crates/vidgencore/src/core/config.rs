use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Primary self-hosted Deemix service base URL
/// Read from DEEMIX_SERVICE_URL_PRIMARY environment variable
/// Empty means the primary service is not configured
pub static DEEMIX_SERVICE_URL_PRIMARY: Lazy<Option<String>> = Lazy::new(|| {
    env::var("DEEMIX_SERVICE_URL_PRIMARY")
        .ok()
        .filter(|s| !s.trim().is_empty())
});

/// Secondary (failover) Deemix service base URL
/// Read from DEEMIX_SERVICE_URL_SECONDARY environment variable
pub static DEEMIX_SERVICE_URL_SECONDARY: Lazy<Option<String>> = Lazy::new(|| {
    env::var("DEEMIX_SERVICE_URL_SECONDARY")
        .ok()
        .filter(|s| !s.trim().is_empty())
});

/// Spotify application credentials for the cover lookup
/// (client-credentials OAuth flow). Both must be set for the Spotify
/// stage of the cover cascade to run; otherwise it is skipped.
pub static SPOTIFY_CLIENT_ID: Lazy<Option<String>> =
    Lazy::new(|| env::var("SPOTIFY_CLIENT_ID").ok().filter(|s| !s.is_empty()));

pub static SPOTIFY_CLIENT_SECRET: Lazy<Option<String>> =
    Lazy::new(|| env::var("SPOTIFY_CLIENT_SECRET").ok().filter(|s| !s.is_empty()));

/// Comma-separated proxy pool for yt-dlp invocations
/// Read from PROXY_URL environment variable; one entry is chosen at
/// random per invocation. Empty means direct connection.
pub static PROXY_POOL: Lazy<Vec<String>> = Lazy::new(|| {
    env::var("PROXY_URL")
        .map(|v| {
            v.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default()
});

/// Temporary files directory for request-scoped artifacts
/// (downloaded audio, cover image, muxed output)
/// Read from TEMP_FILES_DIR environment variable, defaults to /tmp
pub static TEMP_FILES_DIR: Lazy<String> =
    Lazy::new(|| env::var("TEMP_FILES_DIR").unwrap_or_else(|_| "/tmp".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Admin user id for the /logs command
/// Read from ADMIN_USER_ID environment variable
pub static ADMIN_USER_ID: Lazy<Option<i64>> = Lazy::new(|| env::var("ADMIN_USER_ID").ok().and_then(|v| v.parse().ok()));

/// Browser user-agent sent with yt-dlp invocations and page-title fetches.
/// Some extractors refuse requests with a default library user-agent.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Static placeholder used when no cover can be located anywhere.
pub const PLACEHOLDER_COVER_URL: &str = "https://placehold.co/600x600/1a1a1a/ffffff?text=No+Cover";

/// Deemix microservice timeouts
pub mod deemix {
    use super::Duration;

    /// Health probe timeout (in seconds) — a service that cannot answer
    /// /health this fast is treated as down
    pub const HEALTH_TIMEOUT_SECS: u64 = 5;

    /// Resolve request timeout (in seconds) — the service's own timeout
    /// is 60s, so we wait slightly longer
    pub const RESOLVE_TIMEOUT_SECS: u64 = 65;

    pub fn health_timeout() -> Duration {
        Duration::from_secs(HEALTH_TIMEOUT_SECS)
    }

    pub fn resolve_timeout() -> Duration {
        Duration::from_secs(RESOLVE_TIMEOUT_SECS)
    }
}

/// yt-dlp invocation timeouts
pub mod extractor {
    use super::Duration;

    /// Timeout for metadata/search probes (in seconds)
    pub const PROBE_TIMEOUT_SECS: u64 = 60;

    /// Timeout for audio downloads (in seconds)
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 240;

    pub fn probe_timeout() -> Duration {
        Duration::from_secs(PROBE_TIMEOUT_SECS)
    }

    pub fn download_timeout() -> Duration {
        Duration::from_secs(DOWNLOAD_TIMEOUT_SECS)
    }
}

/// ffmpeg merge timeout
pub mod merge {
    use super::Duration;

    /// Timeout for the image+audio mux (in seconds)
    pub const MERGE_TIMEOUT_SECS: u64 = 300;

    pub fn timeout() -> Duration {
        Duration::from_secs(MERGE_TIMEOUT_SECS)
    }
}

/// Validation thresholds
pub mod validation {
    /// Candidates shorter than this (in seconds) are treated as preview
    /// clips and rejected regardless of title match
    pub const MIN_FULL_TRACK_SECS: u64 = 45;
}
