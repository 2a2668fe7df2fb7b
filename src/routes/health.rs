use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse, ProbeResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/probe", get(connectivity_probe))
        .with_state(state)
}

/// Reports whether the completion credential is configured, with a redacted
/// prefix for operational diagnostics.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let token = state.config.llm.api_key.as_deref();
    Json(HealthResponse {
        token_configured: token.is_some(),
        token_prefix: token.map(|t| t.chars().take(8).collect()),
        base_url: state.config.llm.base_url.clone(),
    })
}

/// Issues a read-only call to the completion service's model listing and
/// reports reachability. Diagnostic only.
async fn connectivity_probe(State(state): State<AppState>) -> Json<ProbeResponse> {
    match state.completion.list_models().await {
        Ok(()) => Json(ProbeResponse {
            ok: true,
            detail: "completion service reachable".to_string(),
        }),
        Err(e) => Json(ProbeResponse {
            ok: false,
            detail: e.to_string(),
        }),
    }
}
