//! Internet Archive adapter.
//!
//! Queries the advancedsearch index for the top results by download count
//! and — unlike the other adapters — filters relevance internally: the
//! search API returns off-topic hits even on strong queries, so the first
//! of the top N whose title passes the containment check wins. Nothing
//! qualifying is a normal `None`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::resolve::matching;
use crate::resolve::types::{CandidateResult, SourceId, TargetDescriptor, TrackSource};

/// How many top hits to consider before giving up.
const RESULT_ROWS: usize = 5;

const DEFAULT_BASE_URL: &str = "https://archive.org";

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: Option<SearchBody>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    identifier: String,
    title: Option<String>,
}

pub struct ArchiveSource {
    http: reqwest::Client,
    base_url: String,
}

impl ArchiveSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    async fn search_docs(&self, query: &str) -> Option<Vec<SearchDoc>> {
        let q = format!("{} AND mediatype:(audio)", query);
        let rows = RESULT_ROWS.to_string();
        let result = self
            .http
            .get(format!("{}/advancedsearch.php", self.base_url))
            .query(&[
                ("q", q.as_str()),
                ("fl[]", "identifier"),
                ("fl[]", "title"),
                ("sort[]", "downloads desc"),
                ("rows", rows.as_str()),
                ("output", "json"),
            ])
            .send()
            .await;

        let response = match result {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::warn!("archive: search returned status {}", r.status());
                return None;
            }
            Err(e) => {
                log::warn!("archive: search failed: {}", e);
                return None;
            }
        };

        match response.json::<SearchEnvelope>().await {
            Ok(envelope) => envelope.response.map(|b| b.docs),
            Err(e) => {
                log::warn!("archive: unreadable search payload: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl TrackSource for ArchiveSource {
    fn id(&self) -> SourceId {
        SourceId::Archive
    }

    fn validates_internally(&self) -> bool {
        true
    }

    async fn resolve(&self, target: &TargetDescriptor) -> Option<CandidateResult> {
        let docs = self.search_docs(&target.search_terms()).await?;
        if docs.is_empty() {
            log::debug!("archive: no results for '{}'", target.track_name);
            return None;
        }

        for doc in docs.iter().take(RESULT_ROWS) {
            let Some(ref title) = doc.title else { continue };
            if matching::is_acceptable(title, &target.track_name) {
                log::info!("archive: accepted '{}' ({})", title, doc.identifier);
                return Some(CandidateResult {
                    title: title.clone(),
                    locator: format!("{}/details/{}", DEFAULT_BASE_URL, doc.identifier),
                    duration_secs: None,
                    source: SourceId::Archive,
                });
            }
            log::debug!("archive: '{}' did not match '{}'", title, target.track_name);
        }

        log::info!("archive: none of the top {} results matched", RESULT_ROWS);
        None
    }
}
