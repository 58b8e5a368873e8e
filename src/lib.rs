//! # Co-Scientist Server
//!
//! An AI co-scientist research server: given a research goal, it runs a small
//! multi-agent pipeline (generation, reflection, supervisor) backed by
//! literature search (arXiv, optionally SerpAPI) as a background job, and
//! exposes session-scoped status and activity-log polling over HTTP.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use coscientist::{AppState, api::routes, utils::config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let state = AppState::new(Config::from_env()?);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, routes::app(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`session`] - Session registry and per-session activity log
//! - [`tools`] - Literature search tool (caching, spacing, query budget)
//! - [`runtime`] - Agent runtime boundary and the LLM-backed crew runtime
//! - [`research`] - Research orchestrator and background job runner
//! - [`llm`] - LLM client abstraction
//! - [`types`] - Common types and error handling
//!
//! ## Architecture
//!
//! One background task per research session; all session state lives in
//! process memory and is lost on restart. Search providers and the LLM are
//! reached with per-session credentials, never pooled across sessions.

pub mod api;
pub mod llm;
pub mod research;
pub mod runtime;
pub mod session;
pub mod tools;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use research::{JobRunner, ResearchOrchestrator};
pub use runtime::{AgentRuntime, AgentRuntimeFactory, OpenAiRuntimeFactory};
pub use session::{ActivityLog, SessionRegistry};
pub use tools::{LiteratureSearch, SearchConfig, SearchTool};
pub use types::{AppError, Result};
pub use utils::config::Config;

use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionRegistry>,
    pub activity: Arc<ActivityLog>,
    pub runner: Arc<JobRunner>,
}

impl AppState {
    /// Build production state with the OpenAI-backed runtime factory.
    pub fn new(config: Config) -> Self {
        let factory = Arc::new(OpenAiRuntimeFactory::new(
            &config.llm.api_base,
            &config.llm.model,
        ));
        Self::with_runtime_factory(config, factory)
    }

    /// Build state with a custom runtime factory. Tests use this to script
    /// the agent runtime without network access.
    pub fn with_runtime_factory(
        config: Config,
        runtime_factory: Arc<dyn AgentRuntimeFactory>,
    ) -> Self {
        let config = Arc::new(config);
        let sessions = Arc::new(SessionRegistry::new());
        let activity = Arc::new(ActivityLog::new());
        let runner = Arc::new(JobRunner::new(
            Arc::clone(&sessions),
            Arc::clone(&activity),
            runtime_factory,
            config.providers.clone(),
            SearchConfig::default(),
        ));

        Self {
            config,
            sessions,
            activity,
            runner,
        }
    }
}
