//! Handler types and shared dependencies.

use std::sync::Arc;

use vidgencore::resolve::{CoverResolver, Extractor, Resolver};
use vidgencore::ChatLocks;

use crate::telegram::state::{Dedup, ImageState};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type HandlerResult = Result<(), HandlerError>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub http: reqwest::Client,
    pub resolver: Arc<Resolver>,
    pub cover: Arc<CoverResolver>,
    pub extractor: Arc<Extractor>,
    pub locks: ChatLocks,
    pub images: ImageState,
    pub dedup: Arc<Dedup>,
}

impl HandlerDeps {
    /// Wires the full production dependency graph from the environment.
    pub fn from_env() -> Self {
        let http = reqwest::Client::new();
        let extractor = Arc::new(Extractor::from_env());
        let resolver = Arc::new(Resolver::with_default_sources(http.clone(), Arc::clone(&extractor)));
        let cover = Arc::new(CoverResolver::from_env(http.clone()));

        Self {
            http,
            resolver,
            cover,
            extractor,
            locks: ChatLocks::new(),
            images: ImageState::new(),
            dedup: Arc::new(Dedup::new()),
        }
    }
}
