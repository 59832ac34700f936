//! Resolution orchestrator: fixed-priority provider walk with
//! short-circuit on the first validated hit.
//!
//! `Idle → Normalizing → DirectUrlPath | SearchPath → Resolved | Failed`.
//! A transient failure of one provider advances the chain; nothing rewinds
//! and nothing is retried beyond the documented fallback order.

use std::sync::Arc;

use crate::core::error::AppResult;
use crate::resolve::archive::ArchiveSource;
use crate::resolve::deemix::DeemixClient;
use crate::resolve::extractor::{Extractor, SoundcloudSource, YoutubeSource};
use crate::resolve::matching;
use crate::resolve::normalize::{NormalizedInput, Normalizer};
use crate::resolve::types::{ResolveOutcome, ResolvedTrack, SourceId, TargetDescriptor, TrackSource};

pub struct Resolver {
    normalizer: Normalizer,
    extractor: Arc<Extractor>,
    /// Providers in trust order: licensed source first, free community
    /// sources last. Static for the process lifetime, never reordered
    /// per request.
    sources: Vec<Arc<dyn TrackSource>>,
}

impl Resolver {
    pub fn new(normalizer: Normalizer, extractor: Arc<Extractor>, sources: Vec<Arc<dyn TrackSource>>) -> Self {
        Self {
            normalizer,
            extractor,
            sources,
        }
    }

    /// Wires the production priority list:
    /// Deezer microservice → SoundCloud → YouTube → Internet Archive.
    pub fn with_default_sources(http: reqwest::Client, extractor: Arc<Extractor>) -> Self {
        let sources: Vec<Arc<dyn TrackSource>> = vec![
            Arc::new(DeemixClient::from_env(http.clone())),
            Arc::new(SoundcloudSource::new(Arc::clone(&extractor))),
            Arc::new(YoutubeSource::new(Arc::clone(&extractor))),
            Arc::new(ArchiveSource::new(http.clone())),
        ];
        Self::new(Normalizer::new(http), extractor, sources)
    }

    /// Resolves raw user text to a track, or a clean no-match.
    ///
    /// Errors only on fatal input problems (unreadable streaming link,
    /// empty normalized query); provider trouble never escapes.
    pub async fn resolve(&self, raw_text: &str) -> AppResult<ResolveOutcome> {
        match self.normalizer.normalize(raw_text).await? {
            NormalizedInput::Direct(url) => Ok(self.resolve_direct(url).await),
            NormalizedInput::Search(target) => Ok(self.resolve_search(target).await),
        }
    }

    /// Direct-URL path: the literal input is the audio locator. A direct
    /// link is trusted by definition — the probe only supplies a title,
    /// no validation runs.
    async fn resolve_direct(&self, url: String) -> ResolveOutcome {
        log::info!("resolve: direct URL path for {}", url);
        let record = self.extractor.probe_url(&url).await;

        let (title, source, duration) = match record {
            Some(r) => {
                let source = SourceId::from_extractor_tag(r.extractor.as_deref());
                (r.title.clone(), source, r.duration_secs())
            }
            None => ("Unknown Track".to_string(), SourceId::Youtube, None),
        };

        ResolveOutcome::Resolved {
            track: ResolvedTrack {
                title,
                audio_locator: url,
                source,
                duration_secs: duration,
            },
            target: None,
        }
    }

    /// Search path: walk the priority list, validate each candidate, stop
    /// at the first acceptable one.
    async fn resolve_search(&self, target: TargetDescriptor) -> ResolveOutcome {
        log::info!(
            "resolve: searching for '{}' (artist: {})",
            target.track_name,
            target.artist_name.as_deref().unwrap_or("unknown")
        );

        for source in &self.sources {
            let id = source.id();
            let Some(candidate) = source.resolve(&target).await else {
                log::info!("resolve: {} returned nothing, advancing", id);
                continue;
            };

            if !source.validates_internally() && !matching::is_acceptable(&candidate.title, &target.track_name) {
                log::warn!(
                    "resolve: {} candidate '{}' did not match '{}', advancing",
                    id,
                    candidate.title,
                    target.track_name
                );
                continue;
            }

            if matching::is_preview(candidate.duration_secs) {
                log::warn!(
                    "resolve: {} candidate '{}' is a preview ({}s), advancing",
                    id,
                    candidate.title,
                    candidate.duration_secs.unwrap_or(0)
                );
                continue;
            }

            log::info!("resolve: accepted '{}' from {}", candidate.title, id);
            return ResolveOutcome::Resolved {
                track: ResolvedTrack::from_candidate(candidate),
                target: Some(target),
            };
        }

        log::warn!("resolve: all providers exhausted for '{}'", target.track_name);
        ResolveOutcome::NoMatch
    }
}
