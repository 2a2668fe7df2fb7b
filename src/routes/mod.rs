//! API Routes
//!
//! - `POST /api/` - question + optional file upload, returns `{ "answer": ... }`
//! - `GET /api/health` - credential/configuration diagnostics
//! - `GET /api/probe` - completion-service connectivity check

pub mod ask;
pub mod health;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(ask::router(state.clone()))
        .merge(health::router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
