use crate::AppState;
use crate::api::ApiDoc;
use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/start_research",
            post(crate::api::handlers::research::start_research),
        )
        .route(
            "/api/research_status/{session_id}",
            get(crate::api::handlers::research::research_status),
        )
        .route("/api/health", get(crate::api::handlers::health::health_check))
        .route("/api/openapi.json", get(openapi_json))
}

/// Assemble the full application: routes, open CORS (browser frontends call
/// this API directly), and request tracing.
pub fn app(state: AppState) -> Router {
    create_router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
