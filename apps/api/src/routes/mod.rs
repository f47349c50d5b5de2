pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::enrichment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI enrichment API
        .route(
            "/api/v1/ai/improve-resume",
            post(handlers::handle_improve_resume),
        )
        .route("/api/v1/ai/ats-score", post(handlers::handle_ats_score))
        .route(
            "/api/v1/ai/verify-certificate",
            post(handlers::handle_verify_certificate),
        )
        .with_state(state)
}
