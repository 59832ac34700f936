//! Orchestrator behavior tests with scripted provider fakes.
//!
//! Run with: cargo test --test resolver_test

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use vidgencore::resolve::extractor::Extractor;
use vidgencore::resolve::normalize::Normalizer;
use vidgencore::resolve::types::{CandidateResult, ResolveOutcome, SourceId, TargetDescriptor, TrackSource};
use vidgencore::resolve::Resolver;

/// Scripted provider: returns a fixed candidate (or nothing) and records
/// the order it was consulted in.
struct FakeSource {
    id: SourceId,
    candidate: Option<CandidateResult>,
    internal: bool,
    call_log: Arc<Mutex<Vec<SourceId>>>,
}

impl FakeSource {
    fn new(id: SourceId, candidate: Option<CandidateResult>, call_log: Arc<Mutex<Vec<SourceId>>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            candidate,
            internal: false,
            call_log,
        })
    }

    fn internal(id: SourceId, candidate: Option<CandidateResult>, call_log: Arc<Mutex<Vec<SourceId>>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            candidate,
            internal: true,
            call_log,
        })
    }
}

#[async_trait]
impl TrackSource for FakeSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn validates_internally(&self) -> bool {
        self.internal
    }

    async fn resolve(&self, _target: &TargetDescriptor) -> Option<CandidateResult> {
        self.call_log.lock().unwrap().push(self.id);
        self.candidate.clone()
    }
}

fn candidate(source: SourceId, title: &str, duration: Option<u64>) -> CandidateResult {
    CandidateResult {
        title: title.to_string(),
        locator: format!("https://{}/track", source),
        duration_secs: duration,
        source,
    }
}

fn resolver_with(sources: Vec<Arc<dyn TrackSource>>) -> Resolver {
    let http = reqwest::Client::new();
    // Binary is never present in tests; the direct path degrades to
    // "Unknown Track" and the search path never touches it.
    let extractor = Arc::new(Extractor::new("yt-dlp-test-missing".to_string(), vec![]));
    Resolver::new(Normalizer::new(http), extractor, sources)
}

#[tokio::test]
async fn test_fallback_ordering_reaches_archive_last() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sources: Vec<Arc<dyn TrackSource>> = vec![
        FakeSource::new(SourceId::Deezer, None, log.clone()),
        FakeSource::new(SourceId::Soundcloud, None, log.clone()),
        FakeSource::new(SourceId::Youtube, None, log.clone()),
        FakeSource::internal(
            SourceId::Archive,
            Some(candidate(SourceId::Archive, "Song Name (78rpm)", None)),
            log.clone(),
        ),
    ];

    let outcome = resolver_with(sources).resolve("Song Name").await.unwrap();

    match outcome {
        ResolveOutcome::Resolved { track, .. } => {
            assert_eq!(track.source, SourceId::Archive);
            assert_eq!(track.title, "Song Name (78rpm)");
        }
        other => panic!("expected resolution, got {:?}", other),
    }
    assert_eq!(
        *log.lock().unwrap(),
        vec![SourceId::Deezer, SourceId::Soundcloud, SourceId::Youtube, SourceId::Archive]
    );
}

#[tokio::test]
async fn test_preview_candidate_is_rejected_and_chain_advances() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sources: Vec<Arc<dyn TrackSource>> = vec![
        // Perfect title match but a 20-second decoy clip.
        FakeSource::new(
            SourceId::Soundcloud,
            Some(candidate(SourceId::Soundcloud, "Song Name", Some(20))),
            log.clone(),
        ),
        FakeSource::new(
            SourceId::Youtube,
            Some(candidate(SourceId::Youtube, "Song Name (Official Audio)", Some(200))),
            log.clone(),
        ),
    ];

    let outcome = resolver_with(sources).resolve("Song Name").await.unwrap();

    match outcome {
        ResolveOutcome::Resolved { track, .. } => assert_eq!(track.source, SourceId::Youtube),
        other => panic!("expected resolution, got {:?}", other),
    }
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_title_mismatch_advances_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sources: Vec<Arc<dyn TrackSource>> = vec![
        FakeSource::new(
            SourceId::Soundcloud,
            Some(candidate(SourceId::Soundcloud, "Totally Different Track", Some(180))),
            log.clone(),
        ),
        FakeSource::new(
            SourceId::Youtube,
            Some(candidate(SourceId::Youtube, "Artist - Song Name (Live)", Some(180))),
            log.clone(),
        ),
    ];

    let outcome = resolver_with(sources).resolve("Song Name").await.unwrap();

    match outcome {
        ResolveOutcome::Resolved { track, .. } => {
            assert_eq!(track.source, SourceId::Youtube);
            assert_eq!(track.title, "Artist - Song Name (Live)");
        }
        other => panic!("expected resolution, got {:?}", other),
    }
}

#[tokio::test]
async fn test_first_validated_hit_short_circuits() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sources: Vec<Arc<dyn TrackSource>> = vec![
        FakeSource::new(
            SourceId::Deezer,
            Some(candidate(SourceId::Deezer, "Artist - Song Name", Some(214))),
            log.clone(),
        ),
        FakeSource::new(
            SourceId::Soundcloud,
            Some(candidate(SourceId::Soundcloud, "Song Name", Some(214))),
            log.clone(),
        ),
    ];

    let outcome = resolver_with(sources).resolve("Song Name").await.unwrap();

    match outcome {
        ResolveOutcome::Resolved { track, .. } => assert_eq!(track.source, SourceId::Deezer),
        other => panic!("expected resolution, got {:?}", other),
    }
    // Lower-priority providers are never consulted after a validated hit.
    assert_eq!(*log.lock().unwrap(), vec![SourceId::Deezer]);
}

#[tokio::test]
async fn test_exhaustion_is_no_match_not_error() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sources: Vec<Arc<dyn TrackSource>> = vec![
        FakeSource::new(SourceId::Deezer, None, log.clone()),
        FakeSource::new(SourceId::Soundcloud, None, log.clone()),
        FakeSource::new(SourceId::Youtube, None, log.clone()),
        FakeSource::internal(SourceId::Archive, None, log.clone()),
    ];

    let outcome = resolver_with(sources).resolve("Song Name").await.unwrap();
    assert!(matches!(outcome, ResolveOutcome::NoMatch));
    assert_eq!(log.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_internally_validated_source_skips_external_check() {
    let log = Arc::new(Mutex::new(Vec::new()));
    // The archive adapter filtered against its own index; the orchestrator
    // must not re-reject its pick on the containment rule.
    let sources: Vec<Arc<dyn TrackSource>> = vec![FakeSource::internal(
        SourceId::Archive,
        Some(candidate(SourceId::Archive, "Edison cylinder 1903", None)),
        log.clone(),
    )];

    let outcome = resolver_with(sources).resolve("Song Name").await.unwrap();
    assert!(matches!(
        outcome,
        ResolveOutcome::Resolved { track, .. } if track.source == SourceId::Archive
    ));
}

#[tokio::test]
async fn test_resolved_search_carries_target_for_cover_lookup() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sources: Vec<Arc<dyn TrackSource>> = vec![FakeSource::new(
        SourceId::Soundcloud,
        Some(candidate(SourceId::Soundcloud, "Song Name", Some(120))),
        log.clone(),
    )];

    match resolver_with(sources).resolve("Song Name").await.unwrap() {
        ResolveOutcome::Resolved { target, .. } => {
            let target = target.expect("search path keeps its target");
            assert_eq!(target.track_name, "Song Name");
        }
        other => panic!("expected resolution, got {:?}", other),
    }
}

#[tokio::test]
async fn test_direct_url_bypasses_providers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sources: Vec<Arc<dyn TrackSource>> = vec![FakeSource::new(
        SourceId::Deezer,
        Some(candidate(SourceId::Deezer, "Should Not Be Used", Some(200))),
        log.clone(),
    )];

    let outcome = resolver_with(sources)
        .resolve("https://example.com/song.mp3")
        .await
        .unwrap();

    match outcome {
        ResolveOutcome::Resolved { track, target } => {
            assert_eq!(track.audio_locator, "https://example.com/song.mp3");
            // Probe binary is unavailable in tests; the title degrades.
            assert_eq!(track.title, "Unknown Track");
            assert!(target.is_none());
        }
        other => panic!("expected resolution, got {:?}", other),
    }
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_held_lock_suppresses_second_request_entirely() {
    use vidgencore::ChatLocks;

    let log = Arc::new(Mutex::new(Vec::new()));
    let sources: Vec<Arc<dyn TrackSource>> = vec![FakeSource::new(
        SourceId::Deezer,
        Some(candidate(SourceId::Deezer, "Song Name", Some(200))),
        log.clone(),
    )];
    let resolver = resolver_with(sources);
    let locks = ChatLocks::new();

    // First request holds the chat's lock; a second arriving before it
    // completes must be dropped before any provider is consulted.
    let _guard = locks.try_acquire(42).unwrap();

    if locks.try_acquire(42).is_some() {
        resolver.resolve("Song Name").await.unwrap();
    }

    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_query_never_reaches_providers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sources: Vec<Arc<dyn TrackSource>> = vec![FakeSource::new(SourceId::Deezer, None, log.clone())];

    let result = resolver_with(sources).resolve("--- (feat. Somebody)").await;
    assert!(result.is_err());
    assert!(log.lock().unwrap().is_empty());
}
