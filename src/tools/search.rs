//! Session-scoped literature search with caching, spacing and budgeting.
//!
//! One [`SearchTool`] is constructed per research session and bound to that
//! session's activity log. Agents reach it only through the
//! [`LiteratureSearch`] trait, keeping the agent runtime and the search
//! plumbing decoupled from each other's concrete types.

use crate::session::ActivityLog;
use crate::tools::arxiv::AcademicSearchProvider;
use crate::tools::serpapi::WebSearchProvider;
use crate::types::SearchBundle;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Agent name the tool reports under in the activity log.
pub const SEARCH_TOOL_AGENT: &str = "Search Tool";

/// Narrow search capability the agent runtime depends on.
///
/// Search never fails from the caller's perspective: provider errors and the
/// exhausted query budget both degrade to (partially) empty bundles.
#[async_trait]
pub trait LiteratureSearch: Send + Sync {
    async fn search(&self, query: &str) -> SearchBundle;
}

/// Knobs for the tool's cost-control behavior.
///
/// Defaults match production behavior; tests shrink them.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Hard ceiling on non-cached queries per session.
    pub max_queries: u32,
    /// Minimum spacing between non-cached queries.
    pub min_query_spacing: Duration,
    /// Result cap for the primary academic search.
    pub max_academic_results: usize,
    /// Below this many academic results the web fallback is attempted.
    pub min_academic_results: usize,
    /// Result cap for the secondary web search (kept small to save API calls).
    pub max_web_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_queries: 20,
            min_query_spacing: Duration::from_secs(2),
            max_academic_results: 5,
            min_academic_results: 3,
            max_web_results: 3,
        }
    }
}

struct ToolState {
    cache: HashMap<String, SearchBundle>,
    query_count: u32,
    last_query_at: Option<Instant>,
}

/// Search tool owned by exactly one session.
///
/// State sits behind a `tokio::sync::Mutex` because the spacing step sleeps
/// while a query is logically in flight; the lock also serializes queries so
/// spacing and budget accounting stay exact. Contention is nil since one
/// session runs one job task.
pub struct SearchTool {
    session_id: String,
    config: SearchConfig,
    academic: Arc<dyn AcademicSearchProvider>,
    web: Option<Arc<dyn WebSearchProvider>>,
    activity: Arc<ActivityLog>,
    state: Mutex<ToolState>,
}

impl SearchTool {
    pub fn new(
        session_id: &str,
        config: SearchConfig,
        academic: Arc<dyn AcademicSearchProvider>,
        web: Option<Arc<dyn WebSearchProvider>>,
        activity: Arc<ActivityLog>,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            config,
            academic,
            web,
            activity,
            state: Mutex::new(ToolState {
                cache: HashMap::new(),
                query_count: 0,
                last_query_at: None,
            }),
        }
    }

    fn cache_key(query: &str) -> String {
        query.trim().to_lowercase()
    }
}

#[async_trait]
impl LiteratureSearch for SearchTool {
    async fn search(&self, query: &str) -> SearchBundle {
        self.activity.append(
            &self.session_id,
            SEARCH_TOOL_AGENT,
            "Searching",
            &format!("Query: {query}"),
        );

        let key = Self::cache_key(query);
        let mut state = self.state.lock().await;

        if let Some(bundle) = state.cache.get(&key) {
            tracing::info!(session_id = %self.session_id, query, "search cache hit");
            return bundle.clone();
        }

        // Spacing applies only to non-cached queries; the sleep suspends the
        // job task, never the HTTP tasks or other sessions.
        if let Some(last) = state.last_query_at {
            let elapsed = last.elapsed();
            if elapsed < self.config.min_query_spacing {
                tokio::time::sleep(self.config.min_query_spacing - elapsed).await;
            }
        }

        state.query_count += 1;
        if state.query_count > self.config.max_queries {
            tracing::warn!(
                session_id = %self.session_id,
                max_queries = self.config.max_queries,
                "query budget exhausted"
            );
            // Sentinel is returned, not cached: a later repeat of this query
            // would hit the budget check again, not a poisoned cache entry.
            return SearchBundle {
                error: Some("Query limit reached".to_string()),
                academic: Vec::new(),
                web: Vec::new(),
            };
        }

        let academic = match self
            .academic
            .search(query, self.config.max_academic_results)
            .await
        {
            Ok(papers) => papers,
            Err(e) => {
                tracing::error!(session_id = %self.session_id, query, error = %e, "arXiv search failed");
                Vec::new()
            }
        };

        // The web fallback is attempted even when the academic search failed
        // outright; each sub-search degrades independently.
        let mut web = Vec::new();
        if academic.len() < self.config.min_academic_results {
            if let Some(provider) = &self.web {
                web = match provider.search(query, self.config.max_web_results).await {
                    Ok(results) => results,
                    Err(e) => {
                        tracing::error!(session_id = %self.session_id, query, error = %e, "web search failed");
                        Vec::new()
                    }
                };
            }
        }

        let bundle = SearchBundle {
            error: None,
            academic,
            web,
        };
        state.cache.insert(key, bundle.clone());
        state.last_query_at = Some(Instant::now());

        bundle
    }
}
