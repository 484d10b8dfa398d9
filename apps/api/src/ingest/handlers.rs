//! Axum route handlers for document upload and collection management.
//!
//! Upload orchestration is the only place the resume lifecycle is driven:
//! an `analyzing` placeholder is persisted the moment a file arrives, then
//! the record moves to `done` or `error` exactly once. One file's failure
//! never blocks the others in the same upload.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction;
use crate::ingest;
use crate::models::job::{BatchJdParsed, BatchJdRow, JobDescription};
use crate::models::resume::Resume;
use crate::state::AppState;

const UNTITLED_POSITION: &str = "Untitled position";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResumesResponse {
    pub resumes: Vec<Resume>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadJobsResponse {
    pub jobs: Vec<JobDescription>,
    /// Batch-import rows the AI response did not cover. Reported as a count,
    /// not retried.
    pub failed_rows: usize,
    /// Per-file failure messages; a bad file never aborts the whole upload.
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
}

struct UploadedFile {
    file_name: String,
    file_type: String,
    bytes: bytes::Bytes,
}

async fn collect_files(multipart: &mut Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let file_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        files.push(UploadedFile {
            file_name,
            file_type,
            bytes,
        });
    }

    if files.is_empty() {
        return Err(AppError::Validation("No files in upload".to_string()));
    }
    Ok(files)
}

// ────────────────────────────────────────────────────────────────────────────
// Resume upload
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/upload
///
/// Ingests each uploaded file through the full pipeline: text extraction,
/// OCR fallback, structured extraction, persistence.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResumesResponse>, AppError> {
    let files = collect_files(&mut multipart).await?;

    let mut resumes = Vec::with_capacity(files.len());
    for file in files {
        resumes.push(process_resume_upload(&state, file).await);
    }

    Ok(Json(UploadResumesResponse { resumes }))
}

async fn process_resume_upload(state: &AppState, file: UploadedFile) -> Resume {
    let mut resume = Resume::analyzing(file.file_name, file.file_type);
    if let Err(e) = state.resumes.save(&resume).await {
        warn!(file = %resume.file_name, "failed to persist placeholder: {e}");
    }

    match parse_resume(state, &file.bytes, &mut resume).await {
        Ok(()) => {
            info!(file = %resume.file_name, "resume parsed");
        }
        Err(e) => {
            warn!(file = %resume.file_name, "resume parsing failed: {e}");
            resume.fail();
            if let Err(e) = state.resumes.save(&resume).await {
                warn!(file = %resume.file_name, "failed to persist error status: {e}");
            }
        }
    }

    resume
}

async fn parse_resume(
    state: &AppState,
    bytes: &[u8],
    resume: &mut Resume,
) -> Result<(), AppError> {
    let text = ingest::extract_text(&resume.file_name, bytes, &state.ai).await?;
    let parsed = extraction::extract_resume_fields(&text, &state.ai).await?;
    resume.complete(text, parsed);
    state.resumes.save(resume).await
}

// ────────────────────────────────────────────────────────────────────────────
// Job upload
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/upload
///
/// Spreadsheet files take the batch row path: one AI call for all rows, rows
/// missing from the response are reported as a failure count. Other formats
/// are extracted as text and parsed for every position they contain.
pub async fn handle_upload_jobs(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadJobsResponse>, AppError> {
    let files = collect_files(&mut multipart).await?;

    let mut jobs = Vec::new();
    let mut failed_rows = 0;
    let mut errors = Vec::new();

    for file in files {
        let is_spreadsheet = matches!(
            ingest::file_extension(&file.file_name).as_deref(),
            Some("xlsx" | "xls")
        );
        let outcome = if is_spreadsheet {
            import_job_rows(&state, &file).await
        } else {
            import_job_document(&state, &file).await
        };

        match outcome {
            Ok((file_jobs, file_failed)) => {
                jobs.extend(file_jobs);
                failed_rows += file_failed;
            }
            Err(e) => {
                warn!(file = %file.file_name, "job import failed: {e}");
                errors.push(format!("{}: {e}", file.file_name));
            }
        }
    }

    Ok(Json(UploadJobsResponse {
        jobs,
        failed_rows,
        errors,
    }))
}

async fn import_job_rows(
    state: &AppState,
    file: &UploadedFile,
) -> Result<(Vec<JobDescription>, usize), AppError> {
    let rows = ingest::sheet::collect_jd_rows(&file.bytes)?;
    if rows.is_empty() {
        return Err(AppError::Validation(
            "Spreadsheet contains no usable job rows".to_string(),
        ));
    }

    info!(file = %file.file_name, rows = rows.len(), "batch-parsing job rows");
    let parsed = extraction::extract_job_fields_batch(&rows, &state.ai).await?;
    let (jobs, failed_rows) = reconcile_batch(&rows, parsed, &file.file_name);

    for jd in &jobs {
        state.jobs.save(jd).await?;
    }
    Ok((jobs, failed_rows))
}

/// Maps batch results back to their source rows by `rowIndex`.
///
/// Indices the service failed to return, returned twice, or invented are
/// all counted as failed rows. The row-supplied key clarification wins over
/// the AI-inferred one.
fn reconcile_batch(
    rows: &[BatchJdRow],
    parsed: Vec<BatchJdParsed>,
    file_name: &str,
) -> (Vec<JobDescription>, usize) {
    let mut seen = std::collections::HashSet::new();
    let mut jobs = Vec::new();

    for item in parsed {
        let Some(row) = rows.iter().find(|r| r.row_index == item.row_index) else {
            continue;
        };
        if !seen.insert(item.row_index) {
            continue;
        }

        let mut parsed_data = item.parsed;
        if !row.key_clarification.trim().is_empty() {
            parsed_data.key_clarification = row.key_clarification.clone();
        }

        jobs.push(JobDescription {
            id: row.job_code.clone(),
            title: row.title.clone(),
            file_name: file_name.to_string(),
            raw_content: row.raw_content.clone(),
            parsed_data: Some(parsed_data),
        });
    }

    let failed_rows = rows.len() - jobs.len();
    (jobs, failed_rows)
}

async fn import_job_document(
    state: &AppState,
    file: &UploadedFile,
) -> Result<(Vec<JobDescription>, usize), AppError> {
    let text = ingest::extract_text(&file.file_name, &file.bytes, &state.ai).await?;
    let parsed_list = extraction::extract_job_fields(&text, &state.ai).await?;

    let mut jobs = Vec::with_capacity(parsed_list.len());
    for parsed in parsed_list {
        let id = if parsed.job_code.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            parsed.job_code.clone()
        };
        let title = if parsed.title.trim().is_empty() {
            UNTITLED_POSITION.to_string()
        } else {
            parsed.title.clone()
        };

        let jd = JobDescription {
            id,
            title,
            file_name: file.file_name.clone(),
            raw_content: text.clone(),
            parsed_data: Some(parsed),
        };
        state.jobs.save(&jd).await?;
        jobs.push(jd);
    }

    Ok((jobs, 0))
}

// ────────────────────────────────────────────────────────────────────────────
// Collection management
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Resume>>, AppError> {
    Ok(Json(state.resumes.fetch_all().await?))
}

/// DELETE /api/v1/resumes
pub async fn handle_delete_resumes(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<Value>, AppError> {
    state.resumes.delete_all(&request.ids).await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// DELETE /api/v1/resumes/all
pub async fn handle_clear_resumes(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.resumes.clear().await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobDescription>>, AppError> {
    Ok(Json(state.jobs.fetch_all().await?))
}

/// DELETE /api/v1/jobs
pub async fn handle_delete_jobs(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<Value>, AppError> {
    state.jobs.delete_all(&request.ids).await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// DELETE /api/v1/jobs/all
pub async fn handle_clear_jobs(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.jobs.clear().await?;
    Ok(Json(json!({ "status": "ok" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{JDParsedInfo, JobRequirements};

    fn batch_row(row_index: usize, code: &str, clarification: &str) -> BatchJdRow {
        BatchJdRow {
            row_index,
            job_code: code.to_string(),
            title: format!("Job {code}"),
            raw_content: format!("{code} raw content"),
            key_clarification: clarification.to_string(),
        }
    }

    fn batch_parsed(row_index: usize, clarification: &str) -> BatchJdParsed {
        BatchJdParsed {
            row_index,
            parsed: JDParsedInfo {
                job_code: format!("AI-{row_index}"),
                title: format!("AI title {row_index}"),
                key_clarification: clarification.to_string(),
                description: "desc".to_string(),
                responsibilities: vec![],
                requirements: JobRequirements::default(),
            },
        }
    }

    #[test]
    fn test_missing_row_indices_count_as_failures() {
        let rows = vec![
            batch_row(1, "REQ-1", ""),
            batch_row(2, "REQ-2", ""),
            batch_row(3, "REQ-3", ""),
        ];
        let parsed = vec![batch_parsed(1, ""), batch_parsed(3, "")];

        let (jobs, failed) = reconcile_batch(&rows, parsed, "jobs.xlsx");
        assert_eq!(jobs.len(), 2);
        assert_eq!(failed, 1);
        assert_eq!(jobs[0].id, "REQ-1");
        assert_eq!(jobs[1].id, "REQ-3");
    }

    #[test]
    fn test_duplicate_and_invented_indices_are_ignored() {
        let rows = vec![batch_row(1, "REQ-1", "")];
        let parsed = vec![
            batch_parsed(1, ""),
            batch_parsed(1, ""),
            batch_parsed(42, ""),
        ];

        let (jobs, failed) = reconcile_batch(&rows, parsed, "jobs.xlsx");
        assert_eq!(jobs.len(), 1);
        assert_eq!(failed, 0);
    }

    #[test]
    fn test_row_supplied_clarification_wins_over_inferred() {
        let rows = vec![
            batch_row(1, "REQ-1", "Row clarification"),
            batch_row(2, "REQ-2", ""),
        ];
        let parsed = vec![
            batch_parsed(1, "AI clarification"),
            batch_parsed(2, "AI clarification"),
        ];

        let (jobs, _) = reconcile_batch(&rows, parsed, "jobs.xlsx");
        assert_eq!(
            jobs[0].parsed_data.as_ref().unwrap().key_clarification,
            "Row clarification"
        );
        // With no row value, the inferred one stands.
        assert_eq!(
            jobs[1].parsed_data.as_ref().unwrap().key_clarification,
            "AI clarification"
        );
    }
}
