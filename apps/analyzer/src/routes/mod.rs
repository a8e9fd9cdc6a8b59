pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze;
use crate::extraction::handlers::handle_extract;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/extract", post(handle_extract))
        .route("/api/v1/analyze", post(handle_analyze))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
