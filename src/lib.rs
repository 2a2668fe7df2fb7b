// Tabular Answer Relay - answers questions about uploaded tabular data via an
// external completion service

pub mod config;
pub mod extract;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod routes;
pub mod summarize;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
