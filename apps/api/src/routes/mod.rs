pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::workflow::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/subscription", get(handlers::handle_subscription))
        .route("/api/v1/optimizations", post(handlers::handle_submit))
        .route("/api/v1/optimizations/:id", get(handlers::handle_get))
        .route(
            "/api/v1/optimizations/:id/missing-sections",
            post(handlers::handle_missing_sections),
        )
        .route(
            "/api/v1/optimizations/:id/projects",
            post(handlers::handle_project_choice),
        )
        .route(
            "/api/v1/optimizations/:id/retry",
            post(handlers::handle_retry),
        )
        .route(
            "/api/v1/optimizations/:id/export",
            get(handlers::handle_export),
        )
        .with_state(state)
}
