//! Axum route handler for the matching run.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::matching::scheduler::MatchScheduler;
use crate::models::job::JobDescription;
use crate::models::matching::{MatchResult, ModelTier, TaskStats};
use crate::models::resume::Resume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub resume_ids: Vec<String>,
    pub jd_ids: Vec<String>,
    #[serde(default)]
    pub match_model: ModelTier,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub results: Vec<MatchResult>,
    pub task_stats: TaskStats,
}

/// POST /api/v1/match
///
/// Validates the selection, resolves the records, and runs the bounded
/// worker pool to completion. Results arrive in completion order.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    MatchScheduler::validate_selection(request.resume_ids.len(), request.jd_ids.len())?;

    let resumes: Vec<Resume> = state
        .resumes
        .fetch_all()
        .await?
        .into_iter()
        .filter(|r| request.resume_ids.contains(&r.id))
        .collect();
    let jobs: Vec<JobDescription> = state
        .jobs
        .fetch_all()
        .await?
        .into_iter()
        .filter(|j| request.jd_ids.contains(&j.id))
        .collect();

    if resumes.is_empty() {
        return Err(AppError::NotFound(
            "None of the selected resumes exists".to_string(),
        ));
    }
    if jobs.is_empty() {
        return Err(AppError::NotFound(
            "None of the selected jobs exists".to_string(),
        ));
    }

    info!(
        resumes = resumes.len(),
        jobs = jobs.len(),
        model = request.match_model.as_str(),
        "starting matching run"
    );

    let run = MatchScheduler::new(state.scorer.clone())
        .run(resumes, jobs, request.match_model)
        .await?;

    info!(
        results = run.results.len(),
        duration_ms = run.stats.duration_ms,
        cost = run.stats.usage.total_cost,
        "matching run completed"
    );

    Ok(Json(MatchResponse {
        results: run.results,
        task_stats: run.stats,
    }))
}
