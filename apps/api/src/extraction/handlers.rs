//! Axum route handlers for the thin parse/OCR adapters.
//!
//! Each endpoint is a direct request/response wrapper around one adapter
//! operation; orchestration lives in the upload handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::extraction::{
    extract_job_fields, extract_job_fields_batch, extract_resume_fields,
};
use crate::ingest::OcrEngine;
use crate::models::job::{BatchJdParsed, BatchJdRow, JDParsedInfo};
use crate::models::resume::ResumeParsedInfo;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseJdBatchRequest {
    pub inputs: Vec<BatchJdRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    pub base64_images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub text: String,
}

/// POST /api/v1/parse/resume
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Json(request): Json<ParseContentRequest>,
) -> Result<Json<ResumeParsedInfo>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let parsed = extract_resume_fields(&request.content, &state.ai).await?;
    Ok(Json(parsed))
}

/// POST /api/v1/parse/jd
pub async fn handle_parse_jd(
    State(state): State<AppState>,
    Json(request): Json<ParseContentRequest>,
) -> Result<Json<Vec<JDParsedInfo>>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let parsed = extract_job_fields(&request.content, &state.ai).await?;
    Ok(Json(parsed))
}

/// POST /api/v1/parse/jd-batch
pub async fn handle_parse_jd_batch(
    State(state): State<AppState>,
    Json(request): Json<ParseJdBatchRequest>,
) -> Result<Json<Vec<BatchJdParsed>>, AppError> {
    let parsed = extract_job_fields_batch(&request.inputs, &state.ai).await?;
    Ok(Json(parsed))
}

/// POST /api/v1/ocr
///
/// Degrades to empty text on failure so a scanned upload never dies on a
/// flaky OCR call; callers treat empty text as a reportable degraded success.
pub async fn handle_ocr(
    State(state): State<AppState>,
    Json(request): Json<OcrRequest>,
) -> Json<OcrResponse> {
    let text = match state.ai.recognize(request.base64_images).await {
        Ok(text) => text,
        Err(e) => {
            warn!("OCR request failed: {e}");
            String::new()
        }
    };
    Json(OcrResponse { text })
}
