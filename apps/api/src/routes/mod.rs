pub mod form;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers::handle_generate;
use crate::render::handlers::handle_export_pdf;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/generate", post(handle_generate))
        .route("/api/export-pdf", post(handle_export_pdf))
        // Uploads are buffered whole with no size cap.
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
