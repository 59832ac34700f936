//! Client for the self-hosted Deemix track-location microservices.
//!
//! Two independently deployed instances (primary/secondary) expose the same
//! API: `GET /health` and `POST /search-or-download` taking `{query}` and
//! returning a direct track URL plus metadata. Each resolve is gated on a
//! short health probe so a hung instance costs 5 seconds, not 65.
//!
//! Both instances unconfigured or failing is a normal outcome (`None`),
//! not an error condition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config;
use crate::resolve::types::{CandidateResult, SourceId, TargetDescriptor, TrackSource};

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: Option<String>,
    deezer_logged_in: Option<bool>,
}

impl HealthResponse {
    /// Accepts both deployment flavors of the health payload.
    fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some("healthy") || self.deezer_logged_in == Some(true)
    }
}

#[derive(Debug, Serialize)]
struct ResolveRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    success: bool,
    track_url: Option<String>,
    url: Option<String>,
    artist: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    error: Option<String>,
}

/// Licensed-source adapter with primary/secondary failover.
pub struct DeemixClient {
    http: reqwest::Client,
    primary: Option<String>,
    secondary: Option<String>,
}

impl DeemixClient {
    pub fn new(http: reqwest::Client, primary: Option<String>, secondary: Option<String>) -> Self {
        Self {
            http,
            primary,
            secondary,
        }
    }

    /// Builds the client from the process environment.
    pub fn from_env(http: reqwest::Client) -> Self {
        Self::new(
            http,
            config::DEEMIX_SERVICE_URL_PRIMARY.clone(),
            config::DEEMIX_SERVICE_URL_SECONDARY.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    /// Bounded health probe against one instance.
    async fn is_healthy(&self, base_url: &str) -> bool {
        let result = self
            .http
            .get(format!("{}/health", base_url))
            .timeout(config::deemix::health_timeout())
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => match response.json::<HealthResponse>().await {
                Ok(health) => health.is_healthy(),
                Err(e) => {
                    log::warn!("deezer: unreadable health payload from {}: {}", base_url, e);
                    false
                }
            },
            Ok(response) => {
                log::warn!("deezer: health check at {} returned {}", base_url, response.status());
                false
            }
            Err(e) => {
                log::warn!("deezer: health check failed for {}: {}", base_url, e);
                false
            }
        }
    }

    /// One resolve attempt against one instance. Any failure is `None`.
    async fn resolve_from(&self, base_url: &str, query: &str) -> Option<CandidateResult> {
        if !self.is_healthy(base_url).await {
            return None;
        }

        let response = self
            .http
            .post(format!("{}/search-or-download", base_url))
            .timeout(config::deemix::resolve_timeout())
            .json(&ResolveRequest { query })
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::warn!("deezer: {} returned status {}", base_url, r.status());
                return None;
            }
            Err(e) => {
                log::warn!("deezer: request to {} failed: {}", base_url, e);
                return None;
            }
        };

        let body: ResolveResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                log::warn!("deezer: unreadable resolve payload from {}: {}", base_url, e);
                return None;
            }
        };

        let locator = match body.track_url.or(body.url) {
            Some(l) if body.success => l,
            _ => {
                log::warn!(
                    "deezer: {} found nothing for query: {}",
                    base_url,
                    body.error.as_deref().unwrap_or("no error detail")
                );
                return None;
            }
        };

        let title = match (&body.artist, &body.title) {
            (Some(artist), Some(title)) => format!("{} - {}", artist, title),
            (None, Some(title)) => title.clone(),
            _ => query.to_string(),
        };

        Some(CandidateResult {
            title,
            locator,
            duration_secs: body.duration.map(|d| d.round() as u64),
            source: SourceId::Deezer,
        })
    }
}

#[async_trait]
impl TrackSource for DeemixClient {
    fn id(&self) -> SourceId {
        SourceId::Deezer
    }

    async fn resolve(&self, target: &TargetDescriptor) -> Option<CandidateResult> {
        let query = target.search_terms();

        if let Some(ref primary) = self.primary {
            log::info!("deezer: trying primary service");
            if let Some(candidate) = self.resolve_from(primary, &query).await {
                return Some(candidate);
            }
            log::info!("deezer: primary failed, trying secondary");
        }

        if let Some(ref secondary) = self.secondary {
            log::info!("deezer: trying secondary service");
            if let Some(candidate) = self.resolve_from(secondary, &query).await {
                return Some(candidate);
            }
        }

        if !self.is_configured() {
            log::debug!("deezer: no service configured, skipping");
        } else {
            log::warn!("deezer: all services failed for '{}'", query);
        }
        None
    }
}
