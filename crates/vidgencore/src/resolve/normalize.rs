//! Query normalization: turns raw user text into a canonical search target.
//!
//! Three input shapes are recognized:
//! - a streaming-service link (Spotify, Deezer, Apple Music, Tidal,
//!   YouTube Music, Amazon Music) — the page title is fetched and decoded
//!   into a (track, artist) pair;
//! - any other URL — passed through untouched, to be treated as a direct
//!   audio locator;
//! - free text — noise-stripped and used as the track name.

use lazy_regex::{regex, regex_captures, regex_is_match};
use select::document::Document;
use select::predicate::Name;

use crate::core::error::{AppError, AppResult};
use crate::resolve::types::TargetDescriptor;

/// Crawler user-agent for streaming-service pages: these sites serve the
/// full, server-rendered title only to known crawlers.
const CRAWLER_USER_AGENT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Outcome of normalization: either a search target or a trusted direct URL.
#[derive(Debug, Clone)]
pub enum NormalizedInput {
    /// A bare non-streaming-service URL; bypasses provider search entirely.
    Direct(String),
    /// A canonical (track, artist) target to run the provider chain against.
    Search(TargetDescriptor),
}

/// True if the text is a link to a known streaming-service page (a page
/// about a track, not a source of audio).
pub fn is_streaming_link(text: &str) -> bool {
    regex_is_match!(
        r"^https?://(open\.spotify\.com|www\.deezer\.[^\s/]+|link\.deezer\.[^\s/]+|music\.apple\.com|tidal\.com|listen\.tidal\.com|music\.youtube\.com|music\.amazon\.[^\s/]+)",
        text
    )
}

/// True if the text is a plain URL (any scheme://host shape, no spaces).
pub fn is_plain_url(text: &str) -> bool {
    regex_is_match!(r#"^https?://[^\s"]+$"#, text)
}

/// Strips free-text noise: hyphens become spaces, "(feat. …)"/"(ft. …)"
/// parentheticals are dropped, whitespace is collapsed.
pub fn clean_query(text: &str) -> String {
    let s = text.replace('-', " ");
    let s = regex!(r"(?i)[\(\[]?feat\.?.*?[\)\]]").replace_all(&s, "");
    let s = regex!(r"(?i)[\(\[]?ft\.?.*?[\)\]]").replace_all(&s, "");
    let s = regex!(r"\s+").replace_all(&s, " ");
    s.trim().to_string()
}

/// Strips platform suffixes and decorative prefixes from a streaming-service
/// page title, leaving "Track by Artist" or just "Track".
fn strip_page_title(raw_title: &str) -> String {
    // Apple Music embeds the artist between dashes: "Track – Song by Artist – Apple Music"
    let s = regex!(r"(?i) [–—] Song by (.+?) [–—] Apple Music.*").replace(raw_title, " by $1");
    let s = regex!(r"(?i) [-–—|] Spotify.*").replace(&s, "");
    let s = regex!(r"(?i) on Spotify.*").replace(&s, "");
    let s = regex!(r"(?i) [-–—|] Deezer.*").replace(&s, "");
    let s = regex!(r"(?i) on Deezer.*").replace(&s, "");
    let s = regex!(r"(?i) [-–—|] Apple Music.*").replace(&s, "");
    let s = regex!(r"(?i) on Apple Music.*").replace(&s, "");
    let s = regex!(r"(?i) [-–—|] Tidal.*").replace(&s, "");
    let s = regex!(r"(?i) on Tidal.*").replace(&s, "");
    let s = regex!(r"(?i) [-–—|] Amazon Music.*").replace(&s, "");
    let s = regex!(r"(?i) on Amazon Music.*").replace(&s, "");
    let s = regex!(r"(?i) song and lyrics by ").replace_all(&s, " ");
    // Album info after "from", and single/album/EP markers
    let s = regex!(r"(?i) from .*$").replace(&s, "");
    let s = regex!(r"(?i) - (Single|Album|EP).*").replace(&s, "");
    // Bullets, dashes, zero-width marks at the start
    let s = regex!(r"^[\u{200B}-\u{200D}\u{FEFF}\-–—•\s]+").replace(&s, "");
    s.trim().to_string()
}

/// Splits a cleaned page title into (track, artist) on a " by " or dash
/// separator. No separator means the whole string is the track name.
fn split_title(cleaned: &str) -> (String, Option<String>) {
    if let Some((_, track, artist)) = regex_captures!(r"(?i)^(.+?)\s+(?:by|[-–])\s+(.+)$", cleaned) {
        (track.trim().to_string(), Some(artist.trim().to_string()))
    } else {
        (cleaned.trim().to_string(), None)
    }
}

/// Query normalizer. Holds the HTTP client used for streaming-service page
/// fetches; everything else is pure string work.
#[derive(Clone)]
pub struct Normalizer {
    http: reqwest::Client,
}

impl Normalizer {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Normalizes raw user text into a search target or a direct URL.
    ///
    /// A streaming-service link that cannot be fetched or parsed is fatal
    /// for the request (`AppError::LinkMetadata`) — the caller must not
    /// fall through to a blind search. Free text that cleans down to
    /// nothing is `AppError::EmptyQuery`.
    pub async fn normalize(&self, raw_text: &str) -> AppResult<NormalizedInput> {
        let text = raw_text.trim();

        if is_streaming_link(text) {
            let target = self.target_from_link(text).await?;
            return Ok(NormalizedInput::Search(target));
        }

        if is_plain_url(text) {
            return Ok(NormalizedInput::Direct(text.to_string()));
        }

        let track_name = clean_query(text);
        if track_name.is_empty() {
            return Err(AppError::EmptyQuery);
        }
        Ok(NormalizedInput::Search(TargetDescriptor {
            track_name,
            artist_name: None,
            raw_query: text.to_string(),
        }))
    }

    /// Fetches a streaming-service page and decodes its title into a target.
    async fn target_from_link(&self, link: &str) -> AppResult<TargetDescriptor> {
        let response = self
            .http
            .get(link)
            .header(reqwest::header::USER_AGENT, CRAWLER_USER_AGENT)
            .send()
            .await
            .map_err(|e| AppError::LinkMetadata(format!("fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::LinkMetadata(format!(
                "page returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::LinkMetadata(format!("body read failed: {}", e)))?;

        // Document::from decodes HTML entities while parsing.
        let document = Document::from(body.as_str());
        let raw_title = document
            .find(Name("title"))
            .next()
            .map(|n| n.text())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::LinkMetadata("could not parse title tag".to_string()))?;

        let cleaned = strip_page_title(&raw_title);
        let (track_name, artist_name) = split_title(&cleaned);
        if track_name.is_empty() {
            return Err(AppError::EmptyQuery);
        }

        log::info!(
            "Link title decoded: track='{}' artist='{}'",
            track_name,
            artist_name.as_deref().unwrap_or("")
        );

        Ok(TargetDescriptor {
            track_name,
            artist_name,
            raw_query: link.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_streaming_link_detection() {
        assert!(is_streaming_link("https://open.spotify.com/track/abc123"));
        assert!(is_streaming_link("https://music.apple.com/us/album/x/123"));
        assert!(is_streaming_link("https://www.deezer.com/track/42"));
        assert!(is_streaming_link("https://link.deezer.page.link/xyz"));
        assert!(is_streaming_link("https://tidal.com/browse/track/1"));
        assert!(is_streaming_link("https://music.youtube.com/watch?v=abc"));
        assert!(is_streaming_link("https://music.amazon.de/albums/B0"));

        assert!(!is_streaming_link("https://youtube.com/watch?v=abc"));
        assert!(!is_streaming_link("https://soundcloud.com/artist/track"));
        assert!(!is_streaming_link("Drake God's Plan"));
    }

    #[test]
    fn test_plain_url_detection() {
        assert!(is_plain_url("https://example.com/file.mp3"));
        assert!(is_plain_url("http://youtu.be/abc"));
        assert!(!is_plain_url("not a url"));
        assert!(!is_plain_url("https://example.com/a b"));
    }

    #[test]
    fn test_clean_query_strips_noise() {
        assert_eq!(clean_query("Artist - Track"), "Artist Track");
        assert_eq!(clean_query("Track (feat. Somebody)"), "Track");
        assert_eq!(clean_query("Track (ft. Somebody)"), "Track");
        assert_eq!(clean_query("  lots   of\tspace  "), "lots of space");
    }

    #[test]
    fn test_apple_music_title() {
        let cleaned = strip_page_title("Track – Song by Artist – Apple Music");
        let (track, artist) = split_title(&cleaned);
        assert_eq!(track, "Track");
        assert_eq!(artist.as_deref(), Some("Artist"));
    }

    #[test]
    fn test_spotify_title_suffix() {
        let cleaned = strip_page_title("Song Name - song and lyrics by Some Artist | Spotify");
        // The lyrics filler collapses to a space and the platform suffix is gone.
        assert!(cleaned.starts_with("Song Name"));
        assert!(!cleaned.to_lowercase().contains("spotify"));
    }

    #[test]
    fn test_deezer_single_suffix() {
        let cleaned = strip_page_title("Cool Track - Single on Deezer");
        let (track, _artist) = split_title(&cleaned);
        assert_eq!(track, "Cool Track");
    }

    #[test]
    fn test_leading_decorations_stripped() {
        assert_eq!(strip_page_title("\u{200B}– • Track"), "Track");
    }

    #[test]
    fn test_split_without_separator() {
        let (track, artist) = split_title("Just A Title");
        assert_eq!(track, "Just A Title");
        assert_eq!(artist, None);
    }

    #[tokio::test]
    async fn test_free_text_normalization() {
        let normalizer = Normalizer::new(reqwest::Client::new());
        match normalizer.normalize("Drake - God's Plan (feat. Nobody)").await {
            Ok(NormalizedInput::Search(target)) => {
                assert_eq!(target.track_name, "Drake God's Plan");
                assert_eq!(target.artist_name, None);
                assert_eq!(target.raw_query, "Drake - God's Plan (feat. Nobody)");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let normalizer = Normalizer::new(reqwest::Client::new());
        assert!(matches!(
            normalizer.normalize("--- (feat. Somebody)").await,
            Err(AppError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_direct_url_passthrough() {
        let normalizer = Normalizer::new(reqwest::Client::new());
        match normalizer.normalize("https://youtube.com/watch?v=abc").await {
            Ok(NormalizedInput::Direct(url)) => assert_eq!(url, "https://youtube.com/watch?v=abc"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
