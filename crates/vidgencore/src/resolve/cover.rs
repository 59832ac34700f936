//! Cover-art resolution, decoupled from which provider supplied the audio.
//!
//! Cascade: artist-aware Spotify lookup (client-credentials token, cached
//! process-wide until expiry minus a safety margin) → Deezer keyword search
//! → static placeholder. Every stage failure is absorbed silently and falls
//! through; this component never fails.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::core::config;
use crate::resolve::matching;
use crate::resolve::types::TargetDescriptor;

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const SPOTIFY_API_BASE: &str = "https://api.spotify.com";
const DEEZER_API_BASE: &str = "https://api.deezer.com";

/// Tokens are refreshed this much before their advertised expiry so that an
/// in-flight search never presents a token that dies mid-request.
const EXPIRY_SAFETY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Process-scoped Spotify client-credentials token cache.
///
/// Created once at process start and injected into the cover resolver.
/// Read-mostly; a concurrent expiry check may race into a redundant
/// refresh, which is harmless — the expiry is always re-checked, so the
/// token can never go stale forever.
pub struct SpotifyTokenCache {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: RwLock<Option<CachedToken>>,
}

impl SpotifyTokenCache {
    pub fn new(http: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self::with_token_url(http, SPOTIFY_TOKEN_URL.to_string(), client_id, client_secret)
    }

    pub fn with_token_url(http: reqwest::Client, token_url: String, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            token_url,
            client_id,
            client_secret,
            cached: RwLock::new(None),
        }
    }

    /// Returns a bearer token, fetching a fresh one only when the cached
    /// token is absent or past its safety window.
    pub async fn bearer(&self) -> Option<String> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.is_valid() {
                return Some(cached.token.clone());
            }
        }
        self.refresh().await
    }

    async fn refresh(&self) -> Option<String> {
        let basic = BASE64.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", basic))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::warn!("spotify: token endpoint returned {}", r.status());
                return None;
            }
            Err(e) => {
                log::warn!("spotify: token fetch failed: {}", e);
                return None;
            }
        };

        let body: TokenResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                log::warn!("spotify: unreadable token payload: {}", e);
                return None;
            }
        };

        let ttl = Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_SAFETY_MARGIN);
        let token = CachedToken {
            token: body.access_token.clone(),
            expires_at: Instant::now() + ttl,
        };

        log::debug!("spotify: token refreshed, valid for {}s", ttl.as_secs());
        *self.cached.write().await = Some(token);
        Some(body.access_token)
    }
}

// ── Spotify search payload ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SpotifySearchResponse {
    tracks: Option<SpotifyTracks>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTracks {
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    album: SpotifyAlbum,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
}

// ── Deezer search payload ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DeezerSearchResponse {
    data: Option<Vec<DeezerTrack>>,
}

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    title: String,
    artist: DeezerArtist,
    album: DeezerAlbum,
}

#[derive(Debug, Deserialize)]
struct DeezerArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DeezerAlbum {
    cover_big: Option<String>,
}

/// Track info from the public Deezer catalog, used for cover art and for
/// audio-mode tag verification.
#[derive(Debug, Clone)]
pub struct DeezerTrackInfo {
    pub artist: String,
    pub title: String,
    pub cover_url: Option<String>,
}

/// Cover resolver: always returns a usable image locator.
pub struct CoverResolver {
    http: reqwest::Client,
    spotify: Option<SpotifyTokenCache>,
    spotify_api_base: String,
    deezer_api_base: String,
}

impl CoverResolver {
    pub fn new(http: reqwest::Client, spotify: Option<SpotifyTokenCache>) -> Self {
        Self::with_api_bases(http, spotify, SPOTIFY_API_BASE.to_string(), DEEZER_API_BASE.to_string())
    }

    pub fn with_api_bases(
        http: reqwest::Client,
        spotify: Option<SpotifyTokenCache>,
        spotify_api_base: String,
        deezer_api_base: String,
    ) -> Self {
        Self {
            http,
            spotify,
            spotify_api_base,
            deezer_api_base,
        }
    }

    /// Builds the resolver from the process environment; the Spotify stage
    /// is only wired when both credentials are present.
    pub fn from_env(http: reqwest::Client) -> Self {
        let spotify = match (config::SPOTIFY_CLIENT_ID.clone(), config::SPOTIFY_CLIENT_SECRET.clone()) {
            (Some(id), Some(secret)) => Some(SpotifyTokenCache::new(http.clone(), id, secret)),
            _ => None,
        };
        Self::new(http, spotify)
    }

    /// Resolves a cover image locator. Never fails: cascades Spotify →
    /// Deezer → placeholder.
    pub async fn resolve_cover(&self, target: Option<&TargetDescriptor>, fallback_query: &str) -> String {
        if let Some(url) = self.spotify_cover(target, fallback_query).await {
            return url;
        }

        let keyword = target.map(|t| t.search_terms()).unwrap_or_else(|| fallback_query.to_string());
        if let Some(info) = self.search_deezer_track(&keyword).await {
            if let Some(url) = info.cover_url {
                return url;
            }
        }

        log::info!("cover: all lookups failed, using placeholder");
        config::PLACEHOLDER_COVER_URL.to_string()
    }

    /// Artist-aware Spotify lookup. `None` when unconfigured or on any
    /// failure or empty result.
    async fn spotify_cover(&self, target: Option<&TargetDescriptor>, fallback_query: &str) -> Option<String> {
        let spotify = self.spotify.as_ref()?;
        let token = spotify.bearer().await?;

        let q = match target {
            Some(t) => match &t.artist_name {
                Some(artist) => format!("track:{} artist:{}", t.track_name, artist),
                None => t.track_name.clone(),
            },
            None => fallback_query.to_string(),
        };

        let result = self
            .http
            .get(format!("{}/v1/search", self.spotify_api_base))
            .bearer_auth(&token)
            .query(&[("q", q.as_str()), ("type", "track"), ("limit", "1")])
            .send()
            .await;

        let response = match result {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::warn!("spotify: search returned {}", r.status());
                return None;
            }
            Err(e) => {
                log::warn!("spotify: search failed: {}", e);
                return None;
            }
        };

        let body: SpotifySearchResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                log::warn!("spotify: unreadable search payload: {}", e);
                return None;
            }
        };

        body.tracks?
            .items
            .into_iter()
            .next()?
            .album
            .images
            .into_iter()
            .next()
            .map(|img| img.url)
    }

    /// Keyword search against the public Deezer catalog. Used both as the
    /// second cover stage and by audio mode to verify file tags.
    pub async fn search_deezer_track(&self, query: &str) -> Option<DeezerTrackInfo> {
        let result = self
            .http
            .get(format!("{}/search", self.deezer_api_base))
            .query(&[("q", query), ("limit", "1")])
            .send()
            .await;

        let response = match result {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::warn!("deezer catalog: search returned {}", r.status());
                return None;
            }
            Err(e) => {
                log::warn!("deezer catalog: search failed: {}", e);
                return None;
            }
        };

        let body: DeezerSearchResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                log::warn!("deezer catalog: unreadable payload: {}", e);
                return None;
            }
        };

        let track = body.data?.into_iter().next()?;
        Some(DeezerTrackInfo {
            artist: track.artist.name,
            title: track.title,
            cover_url: track.album.cover_big,
        })
    }

    /// Audio-mode cover lookup with the tag-mismatch refinement: when the
    /// found artist shares nothing with the tagged performer, retry once
    /// with an artist-qualified query.
    pub async fn cover_for_tags(&self, performer: Option<&str>, title: &str) -> (String, Option<DeezerTrackInfo>) {
        let mut found = self.search_deezer_track(title).await;

        if let (Some(p), Some(info)) = (performer, &found) {
            if !matching::artists_overlap(p, &info.artist) {
                log::info!(
                    "cover: artist mismatch (expected '{}', got '{}'), refining search",
                    p,
                    info.artist
                );
                if let Some(refined) = self.search_deezer_track(&format!("{} {}", p, title)).await {
                    found = Some(refined);
                }
            }
        }

        let cover = found
            .as_ref()
            .and_then(|i| i.cover_url.clone())
            .unwrap_or_else(|| config::PLACEHOLDER_COVER_URL.to_string());
        (cover, found)
    }
}
