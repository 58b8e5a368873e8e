use crate::{
    AppState, session,
    types::{
        AppError, Credentials, ResearchStatusResponse, Result, SessionStatus,
        StartResearchRequest, StartResearchResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
};

/// Start a new research session
#[utoipa::path(
    post,
    path = "/api/start_research",
    request_body = StartResearchRequest,
    responses(
        (status = 200, description = "Research process started", body = StartResearchResponse),
        (status = 400, description = "Missing research goal or OpenAI API key")
    ),
    tag = "research"
)]
pub async fn start_research(
    State(state): State<AppState>,
    Json(payload): Json<StartResearchRequest>,
) -> Result<Json<StartResearchResponse>> {
    let research_goal = payload
        .research_goal
        .filter(|goal| !goal.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Research goal is required".to_string()))?;

    let openai_api_key = payload
        .openai_api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("OpenAI API key is required".to_string()))?;

    let session_id = session::new_session_id();
    state.sessions.create(&session_id);

    // Fire-and-forget: the handler returns as soon as the job is spawned.
    state.runner.start(
        session_id.clone(),
        research_goal,
        Credentials {
            openai_api_key,
            serpapi_key: payload.serpapi_key.filter(|key| !key.trim().is_empty()),
        },
    );

    Ok(Json(StartResearchResponse {
        status: "success".to_string(),
        session_id,
        message: "Research process started".to_string(),
    }))
}

/// Poll the status of a research session
#[utoipa::path(
    get,
    path = "/api/research_status/{session_id}",
    params(
        ("session_id" = String, Path, description = "Session id returned by start_research")
    ),
    responses(
        (status = 200, description = "Current session state", body = ResearchStatusResponse),
        (status = 404, description = "Unknown session id")
    ),
    tag = "research"
)]
pub async fn research_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ResearchStatusResponse>> {
    let snapshot = state.sessions.get(&session_id)?;
    let logs = state.activity.entries(&session_id);

    let result = match snapshot.status {
        SessionStatus::Completed => snapshot.result,
        SessionStatus::Error => snapshot
            .error_message
            .map(|message| serde_json::json!({ "error": message })),
        _ => None,
    };

    Ok(Json(ResearchStatusResponse {
        status: "success".to_string(),
        process_status: snapshot.status,
        logs,
        result,
    }))
}
