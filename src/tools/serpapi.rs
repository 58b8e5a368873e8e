//! SerpAPI web search client.
//!
//! Secondary, paid search source. The tool only consults it when the arXiv
//! search under-delivers and the session supplied a SerpAPI key, so most
//! sessions never touch it.

use crate::types::{AppError, Result, WebRecord};
use async_trait::async_trait;
use serde::Deserialize;

/// Provider of organic web results for a text query.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<WebRecord>>;
}

/// HTTP client for the SerpAPI Google engine.
pub struct SerpApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SerpApiClient {
    /// `base_url` is the API root, e.g. `https://serpapi.com`. The key is
    /// session-scoped and must not be shared between sessions.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl WebSearchProvider for SerpApiClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<WebRecord>> {
        let url = format!("{}/search.json", self.base_url);
        let response: SearchResponse = self
            .http
            .get(&url)
            .query(&[
                ("engine", "google".to_string()),
                ("q", query.to_string()),
                ("num", limit.to_string()),
                ("api_key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("SerpAPI request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::Search(format!("SerpAPI returned an error status: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::Search(format!("SerpAPI response unreadable: {e}")))?;

        Ok(response
            .organic_results
            .into_iter()
            .take(limit)
            .map(|r| WebRecord {
                title: r.title,
                link: r.link,
                snippet: r.snippet,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}
