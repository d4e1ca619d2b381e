pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route("/api/v1/interviews", post(handlers::handle_start_interview))
        .route(
            "/api/v1/interviews/:id",
            get(handlers::handle_get_interview).delete(handlers::handle_discard_interview),
        )
        .route(
            "/api/v1/interviews/:id/profile",
            post(handlers::handle_submit_profile),
        )
        .route(
            "/api/v1/interviews/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .with_state(state)
}
