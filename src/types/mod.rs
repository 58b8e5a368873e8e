use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// Body of `POST /api/start_research`.
///
/// Fields are optional at the serde level so that missing values surface as a
/// 400 with a message instead of a deserialization rejection.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct StartResearchRequest {
    pub research_goal: Option<String>,
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serpapi_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartResearchResponse {
    pub status: String,
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResearchStatusResponse {
    pub status: String,
    pub process_status: SessionStatus,
    pub logs: Vec<ActivityLogEntry>,
    /// Structured research output; null until the session completes.
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

// ============= Session Types =============

/// Lifecycle of a research session: pending -> running -> {completed | error}.
/// Terminal states are final.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Error)
    }
}

/// One observability event: which agent did what, with what outcome, when.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityLogEntry {
    /// Wall-clock timestamp, second resolution (`%Y-%m-%d %H:%M:%S`).
    pub timestamp: String,
    pub agent: String,
    pub action: String,
    pub result: String,
}

/// Per-session API credentials supplied with the start request.
///
/// Never shared across sessions: each job builds its own search tool and
/// runtime from these so one session's key cannot affect another's budget.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub serpapi_key: Option<String>,
}

// ============= Search Types =============

/// One ranked academic paper from the primary literature search.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PaperRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    /// Publication date (`YYYY-MM-DD`); None when the feed omits it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

/// One organic result from the secondary web search.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct WebRecord {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Result bundle returned by the search capability.
///
/// `error` is set only on the budget-exceeded sentinel; degraded sub-searches
/// return empty lists instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SearchBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub academic: Vec<PaperRecord>,
    pub web: Vec<WebRecord>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Orchestration error: {0}")]
    Orchestration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            AppError::Search(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::LLM(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Orchestration(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "status": "error",
            "message": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
