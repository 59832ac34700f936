//! Generic media extraction via the yt-dlp external process.
//!
//! One wrapper covers three uses: site-restricted top-hit search
//! (`scsearch1:` / `ytsearch1:`), direct-URL metadata probes, and the
//! final audio download. Every invocation is time-bounded, carries a
//! realistic browser user-agent, skips strict certificate validation, and
//! optionally routes through one randomly chosen proxy from the configured
//! pool. YouTube-family targets get the android client identity hint that
//! avoids that platform's bot-detection throttling.
//!
//! Output is one newline-free JSON object; a parse failure or non-zero
//! exit is logged and degrades to `None`, never an error.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::resolve::types::{CandidateResult, SourceId, TargetDescriptor, TrackSource};

/// Site restriction for top-hit searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSite {
    Soundcloud,
    Youtube,
}

impl SearchSite {
    fn prefix(self) -> &'static str {
        match self {
            SearchSite::Soundcloud => "scsearch1:",
            SearchSite::Youtube => "ytsearch1:",
        }
    }
}

/// One structured record emitted by the extraction tool.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedRecord {
    pub title: String,
    pub webpage_url: Option<String>,
    pub url: Option<String>,
    pub duration: Option<f64>,
    pub extractor: Option<String>,
}

impl ExtractedRecord {
    /// Canonical locator: the page URL when present, the media URL otherwise.
    pub fn locator(&self) -> Option<String> {
        self.webpage_url.clone().or_else(|| self.url.clone())
    }

    pub fn duration_secs(&self) -> Option<u64> {
        self.duration.map(|d| d.round() as u64)
    }
}

fn is_youtube_family(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// yt-dlp process wrapper.
pub struct Extractor {
    bin: String,
    proxy_pool: Vec<String>,
}

impl Extractor {
    pub fn new(bin: String, proxy_pool: Vec<String>) -> Self {
        Self { bin, proxy_pool }
    }

    pub fn from_env() -> Self {
        Self::new(config::YTDL_BIN.clone(), config::PROXY_POOL.clone())
    }

    /// One randomly chosen proxy from the pool, if any is configured.
    fn pick_proxy(&self) -> Option<&str> {
        self.proxy_pool.choose(&mut rand::thread_rng()).map(|s| s.as_str())
    }

    /// Common argument tail for every invocation.
    fn push_common_args(&self, args: &mut Vec<String>, youtube_hint: bool) {
        args.push("--no-playlist".to_string());
        args.push("--no-check-certificate".to_string());
        args.push("--user-agent".to_string());
        args.push(config::BROWSER_USER_AGENT.to_string());

        if let Some(proxy) = self.pick_proxy() {
            log::debug!("extractor: using proxy {}", proxy);
            args.push("--proxy".to_string());
            args.push(proxy.to_string());
        }

        if youtube_hint {
            args.push("--extractor-args".to_string());
            args.push("youtube:player_client=android".to_string());
        }
    }

    fn probe_args(&self, query_or_url: &str, youtube_hint: bool) -> Vec<String> {
        let mut args = vec![query_or_url.to_string(), "--dump-json".to_string()];
        self.push_common_args(&mut args, youtube_hint);
        args
    }

    fn download_args(&self, url: &str, output: &str) -> Vec<String> {
        let mut args = vec![
            url.to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--output".to_string(),
            output.to_string(),
        ];
        self.push_common_args(&mut args, is_youtube_family(url));
        args
    }

    fn parse_record(stdout: &[u8]) -> Option<ExtractedRecord> {
        let text = String::from_utf8_lossy(stdout);
        let line = text.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<ExtractedRecord>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("extractor: JSON parse error: {}", e);
                None
            }
        }
    }

    /// Runs a probe invocation and parses its single-record output.
    async fn run_probe(&self, args: Vec<String>, label: &str) -> Option<ExtractedRecord> {
        let result = timeout(
            config::extractor::probe_timeout(),
            TokioCommand::new(&self.bin).args(&args).output(),
        )
        .await;

        match result {
            Ok(Ok(output)) if output.status.success() => Self::parse_record(&output.stdout),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                log::warn!("extractor: {} failed (exit {:?}): {}", label, output.status.code(), stderr);
                None
            }
            Ok(Err(e)) => {
                log::warn!("extractor: failed to spawn {} for {}: {}", self.bin, label, e);
                None
            }
            Err(_) => {
                log::warn!(
                    "extractor: {} timed out after {}s",
                    label,
                    config::extractor::PROBE_TIMEOUT_SECS
                );
                None
            }
        }
    }

    /// Site-restricted search returning the top match's metadata, untouched.
    pub async fn search(&self, site: SearchSite, query: &str) -> Option<ExtractedRecord> {
        let expr = format!("{}{}", site.prefix(), query);
        let args = self.probe_args(&expr, site == SearchSite::Youtube);
        self.run_probe(args, &format!("search '{}'", expr)).await
    }

    /// Metadata probe for a direct URL.
    pub async fn probe_url(&self, url: &str) -> Option<ExtractedRecord> {
        let args = self.probe_args(url, is_youtube_family(url));
        self.run_probe(args, "url probe").await
    }

    /// Downloads a locator's audio track as MP3 to `output`.
    pub async fn download_audio(&self, url: &str, output: &Path) -> AppResult<()> {
        let output_str = output.to_string_lossy().to_string();
        let args = self.download_args(url, &output_str);

        log::info!("extractor: downloading audio from {}", url);

        let result = timeout(
            config::extractor::download_timeout(),
            TokioCommand::new(&self.bin).args(&args).output(),
        )
        .await
        .map_err(|_| AppError::Asset("audio download timed out".to_string()))?
        .map_err(|e| AppError::Asset(format!("failed to run {}: {}", self.bin, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AppError::Asset(format!("audio download failed: {}", stderr.trim())));
        }

        Ok(())
    }
}

/// Community-source adapter: SoundCloud top hit, validated by the caller.
pub struct SoundcloudSource {
    extractor: Arc<Extractor>,
}

impl SoundcloudSource {
    pub fn new(extractor: Arc<Extractor>) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl TrackSource for SoundcloudSource {
    fn id(&self) -> SourceId {
        SourceId::Soundcloud
    }

    async fn resolve(&self, target: &TargetDescriptor) -> Option<CandidateResult> {
        let record = self.extractor.search(SearchSite::Soundcloud, &target.search_terms()).await?;
        Some(CandidateResult {
            locator: record.locator()?,
            duration_secs: record.duration_secs(),
            title: record.title,
            source: SourceId::Soundcloud,
        })
    }
}

/// Fallback video-platform adapter: YouTube top hit, validated by the caller.
pub struct YoutubeSource {
    extractor: Arc<Extractor>,
}

impl YoutubeSource {
    pub fn new(extractor: Arc<Extractor>) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl TrackSource for YoutubeSource {
    fn id(&self) -> SourceId {
        SourceId::Youtube
    }

    async fn resolve(&self, target: &TargetDescriptor) -> Option<CandidateResult> {
        let record = self.extractor.search(SearchSite::Youtube, &target.search_terms()).await?;
        Some(CandidateResult {
            locator: record.locator()?,
            duration_secs: record.duration_secs(),
            title: record.title,
            source: SourceId::Youtube,
        })
    }
}
