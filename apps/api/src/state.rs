use std::sync::Arc;

use crate::ai_client::AiClient;
use crate::matching::scheduler::MatchScorer;
use crate::models::job::JobDescription;
use crate::models::resume::Resume;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub ai: AiClient,
    /// Injectable collection stores (Postgres in production, in-memory in tests).
    pub resumes: Arc<dyn RecordStore<Resume>>,
    pub jobs: Arc<dyn RecordStore<JobDescription>>,
    /// Pluggable scorer backing the matching scheduler.
    pub scorer: Arc<dyn MatchScorer>,
}
