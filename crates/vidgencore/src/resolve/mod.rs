//! Multi-source track resolution.
//!
//! Given a noisy free-text query or a streaming-service link, decide which
//! of several unreliable providers actually answers the request, validate
//! the answer is not a decoy (preview clip, unrelated track), and hand back
//! a single resolved track — or a clean "no match".
//!
//! Providers are consulted strictly in priority order (licensed microservice
//! first, free community sources last) and the first validated hit wins.
//! Cover art is resolved independently of which provider supplied the audio.

pub mod archive;
pub mod cover;
pub mod deemix;
pub mod extractor;
pub mod matching;
pub mod normalize;
pub mod orchestrator;
pub mod types;

pub use archive::ArchiveSource;
pub use cover::{CoverResolver, DeezerTrackInfo, SpotifyTokenCache};
pub use deemix::DeemixClient;
pub use extractor::{Extractor, SoundcloudSource, YoutubeSource};
pub use normalize::Normalizer;
pub use orchestrator::Resolver;
pub use types::{CandidateResult, ResolveOutcome, ResolvedTrack, SourceId, TargetDescriptor, TrackSource};
