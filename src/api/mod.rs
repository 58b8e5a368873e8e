//! HTTP API handlers and routes.
//!
//! The REST layer is deliberately thin: it validates start requests, creates
//! sessions, and reads registry/log state back to pollers. It never waits on
//! a running job.
//!
//! # API Endpoints
//!
//! - `POST /api/start_research` - Validate the request, create a session,
//!   launch the background job; returns the session id immediately.
//! - `GET /api/research_status/{session_id}` - Poll a session: current
//!   status, full activity log, and the result once completed.
//! - `GET /api/health` - Health check.
//! - `GET /api/openapi.json` - Generated OpenAPI document.
//!
//! There is no authentication: callers bring their own provider API keys in
//! the start request, scoped to that one session.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::types;
use utoipa::OpenApi;

/// OpenAPI document for the research API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::research::start_research,
        handlers::research::research_status,
        handlers::health::health_check,
    ),
    components(schemas(
        types::StartResearchRequest,
        types::StartResearchResponse,
        types::ResearchStatusResponse,
        types::HealthResponse,
        types::SessionStatus,
        types::ActivityLogEntry,
        types::PaperRecord,
        types::WebRecord,
        types::SearchBundle,
    )),
    tags(
        (name = "research", description = "Research session lifecycle"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
