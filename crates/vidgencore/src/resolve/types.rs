//! Data model for one resolution request.

use async_trait::async_trait;
use strum::Display;

use crate::resolve::normalize::clean_query;

/// External source of audio locators, in trust order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SourceId {
    Deezer,
    Soundcloud,
    Youtube,
    Archive,
}

impl SourceId {
    /// Maps a yt-dlp extractor tag onto a source id. Used on the direct-URL
    /// path where the extraction tool reports what it recognized.
    pub fn from_extractor_tag(tag: Option<&str>) -> Self {
        match tag {
            Some(t) if t.to_lowercase().contains("soundcloud") => SourceId::Soundcloud,
            Some(t) if t.to_lowercase().contains("archive") => SourceId::Archive,
            _ => SourceId::Youtube,
        }
    }
}

/// The normalized (track, artist) the pipeline is trying to match.
///
/// Derived once per request; passed read-only to every provider and to the
/// match validator. `track_name` is guaranteed non-empty by the normalizer —
/// resolution does not start otherwise.
#[derive(Debug, Clone)]
pub struct TargetDescriptor {
    pub track_name: String,
    pub artist_name: Option<String>,
    /// The user's original text, preserved for fallback keyword searches.
    pub raw_query: String,
}

impl TargetDescriptor {
    /// Canonical search string handed to providers: track plus artist,
    /// noise-stripped.
    pub fn search_terms(&self) -> String {
        match &self.artist_name {
            Some(artist) => clean_query(&format!("{} {}", self.track_name, artist)),
            None => self.track_name.clone(),
        }
    }
}

/// An unvalidated result returned by one provider adapter.
///
/// Produced by an adapter, consumed by the validator, never persisted.
#[derive(Debug, Clone)]
pub struct CandidateResult {
    pub title: String,
    pub locator: String,
    pub duration_secs: Option<u64>,
    pub source: SourceId,
}

/// The orchestrator's final answer for a successful resolution.
#[derive(Debug, Clone)]
pub struct ResolvedTrack {
    pub title: String,
    pub audio_locator: String,
    pub source: SourceId,
    pub duration_secs: Option<u64>,
}

impl ResolvedTrack {
    pub fn from_candidate(candidate: CandidateResult) -> Self {
        Self {
            title: candidate.title,
            audio_locator: candidate.locator,
            source: candidate.source,
            duration_secs: candidate.duration_secs,
        }
    }
}

/// Terminal state of one resolution request. `NoMatch` is a normal outcome,
/// not an error — every provider was consulted and nothing validated.
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    Resolved {
        track: ResolvedTrack,
        /// The descriptor the search ran against; `None` on the direct-URL
        /// path where no search happened. Callers use it for the
        /// independent cover lookup.
        target: Option<TargetDescriptor>,
    },
    NoMatch,
}

/// Uniform provider contract: resolve a target to a candidate, or nothing.
///
/// Implementations are non-throwing in the success/failure sense — fatal
/// I/O errors are swallowed, logged with the provider identity, and
/// converted to `None`. They are not retried within the adapter.
#[async_trait]
pub trait TrackSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Whether this adapter filters its own results against the target.
    /// When true the orchestrator skips the external validation step.
    fn validates_internally(&self) -> bool {
        false
    }

    async fn resolve(&self, target: &TargetDescriptor) -> Option<CandidateResult>;
}
