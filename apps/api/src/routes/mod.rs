pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::extraction::handlers as parse;
use crate::ingest::handlers as documents;
use crate::matching::handlers as matching;
use crate::state::AppState;

/// Uploads carry whole PDFs and spreadsheets; the axum default (2 MB) is too
/// small for scanned resumes.
const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document collections
        .route(
            "/api/v1/resumes/upload",
            post(documents::handle_upload_resumes),
        )
        .route(
            "/api/v1/resumes",
            get(documents::handle_list_resumes).delete(documents::handle_delete_resumes),
        )
        .route("/api/v1/resumes/all", delete(documents::handle_clear_resumes))
        .route("/api/v1/jobs/upload", post(documents::handle_upload_jobs))
        .route(
            "/api/v1/jobs",
            get(documents::handle_list_jobs).delete(documents::handle_delete_jobs),
        )
        .route("/api/v1/jobs/all", delete(documents::handle_clear_jobs))
        // Thin adapters over the extraction operations
        .route("/api/v1/parse/resume", post(parse::handle_parse_resume))
        .route("/api/v1/parse/jd", post(parse::handle_parse_jd))
        .route("/api/v1/parse/jd-batch", post(parse::handle_parse_jd_batch))
        .route("/api/v1/ocr", post(parse::handle_ocr))
        // Matching
        .route("/api/v1/match", post(matching::handle_match))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(state)
}
