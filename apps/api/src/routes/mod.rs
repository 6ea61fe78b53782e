pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::parsing::handlers;
use crate::parsing::handlers::{MAX_FILES_PER_BATCH, MAX_FILE_SIZE_BYTES};
use crate::state::AppState;

/// Whole-request ceiling for the multipart upload endpoint: the per-file and
/// per-batch limits plus slack for multipart framing.
const UPLOAD_BODY_LIMIT: usize = MAX_FILES_PER_BATCH * MAX_FILE_SIZE_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/parsing-resumes/upload-and-parse",
            post(handlers::handle_upload_and_parse),
        )
        .route(
            "/api/v1/parsing-resumes/analyze-applications/:job_id",
            post(handlers::handle_analyze_applications),
        )
        .route(
            "/api/v1/parsing-resumes/export",
            post(handlers::handle_export),
        )
        .route(
            "/api/v1/parsing-resumes/save-list",
            post(handlers::handle_save_list),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(state)
}
