//! Matching Scheduler: bounded-concurrency fan-out of resume-vs-jobs scoring.
//!
//! A shared work queue feeds `min(5, queue_len)` worker tasks. Each worker
//! loops: pop the next resume (first pop wins), score it against the full
//! selected job set, fold the outcome into the shared results and usage
//! accumulators. Results append in completion order, not submission order.
//! Every selected, fully-parsed resume appears exactly once in the final
//! report: scoring failures become placeholder entries instead of dropped
//! rows.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{error, warn};

use crate::errors::AppError;
use crate::matching::cost;
use crate::models::job::JobDescription;
use crate::models::matching::{
    CallUsage, JDMatchDetail, MatchProgress, MatchResult, ModelTier, TaskStats, UsageMetrics,
};
use crate::models::resume::{ItemStatus, Resume};

/// Worker-pool cap. Selections are also capped at this size, so a run never
/// holds more than this many scoring calls in flight.
pub const MAX_CONCURRENT_MATCHES: usize = 5;
/// Per-run selection cap for both resumes and jobs.
pub const MAX_SELECTION: usize = 5;

/// Scoring seam between the scheduler and the extraction adapter.
/// Carried in `AppState` as `Arc<dyn MatchScorer>`; tests swap in a mock.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(
        &self,
        resume: &Resume,
        jobs: &[JobDescription],
        tier: ModelTier,
    ) -> Result<(MatchResult, CallUsage), AppError>;
}

/// Outcome of a completed run: the ordered report plus sealed stats.
#[derive(Debug, Clone)]
pub struct MatchRun {
    pub results: Vec<MatchResult>,
    pub stats: TaskStats,
}

pub struct MatchScheduler {
    scorer: Arc<dyn MatchScorer>,
}

impl MatchScheduler {
    pub fn new(scorer: Arc<dyn MatchScorer>) -> Self {
        Self { scorer }
    }

    /// Pre-run guardrail on the raw selection counts. Enforced before any
    /// worker is spawned so an oversized request fails fast instead of
    /// partially running.
    pub fn validate_selection(resume_count: usize, jd_count: usize) -> Result<(), AppError> {
        if resume_count == 0 || jd_count == 0 {
            return Err(AppError::Validation(
                "Select at least one resume and one job before matching".to_string(),
            ));
        }
        if resume_count > MAX_SELECTION || jd_count > MAX_SELECTION {
            return Err(AppError::Validation(format!(
                "To keep analysis quality and speed, compare at most {MAX_SELECTION} resumes and {MAX_SELECTION} jobs per run"
            )));
        }
        Ok(())
    }

    /// Runs a full matching pass without a progress observer.
    pub async fn run(
        &self,
        resumes: Vec<Resume>,
        jobs: Vec<JobDescription>,
        tier: ModelTier,
    ) -> Result<MatchRun, AppError> {
        let (progress_tx, _progress_rx) = watch::channel(MatchProgress::default());
        self.run_with_progress(resumes, jobs, tier, progress_tx).await
    }

    /// Runs a full matching pass, publishing `{current, total}` after each
    /// completed resume. `current` only ever increases.
    pub async fn run_with_progress(
        &self,
        resumes: Vec<Resume>,
        jobs: Vec<JobDescription>,
        tier: ModelTier,
        progress_tx: watch::Sender<MatchProgress>,
    ) -> Result<MatchRun, AppError> {
        Self::validate_selection(resumes.len(), jobs.len())?;

        // A resume whose own parsing never completed is excluded from the run
        // entirely and not represented in the report.
        let ready: Vec<Resume> = resumes
            .into_iter()
            .filter(|r| r.status == ItemStatus::Done)
            .collect();
        if ready.is_empty() {
            return Err(AppError::Validation(
                "None of the selected resumes has finished parsing".to_string(),
            ));
        }

        let total = ready.len();
        let mut stats = TaskStats::started(Utc::now());
        let _ = progress_tx.send(MatchProgress { current: 0, total });

        let queue = Arc::new(Mutex::new(ready.into_iter().collect::<VecDeque<_>>()));
        let results = Arc::new(Mutex::new(Vec::with_capacity(total)));
        let metrics = Arc::new(Mutex::new(UsageMetrics::default()));
        let completed = Arc::new(Mutex::new(0usize));
        let jobs = Arc::new(jobs);
        let progress_tx = Arc::new(progress_tx);

        let worker_count = MAX_CONCURRENT_MATCHES.min(total);
        let mut handles = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let results = Arc::clone(&results);
            let metrics = Arc::clone(&metrics);
            let completed = Arc::clone(&completed);
            let jobs = Arc::clone(&jobs);
            let progress_tx = Arc::clone(&progress_tx);
            let scorer = Arc::clone(&self.scorer);

            handles.push(tokio::spawn(async move {
                loop {
                    // Atomic pop: the lock guarantees no resume is scored twice.
                    let resume = { queue.lock().await.pop_front() };
                    let Some(resume) = resume else { break };

                    let entry = match scorer.score(&resume, &jobs, tier).await {
                        Ok((result, usage)) if !result.matches.is_empty() => {
                            let mut metrics = metrics.lock().await;
                            cost::accumulate(&mut metrics, &usage);
                            result
                        }
                        Ok((_, _)) => {
                            warn!(
                                worker_id,
                                resume = %resume.file_name,
                                "scoring returned no matches"
                            );
                            empty_placeholder(&resume)
                        }
                        Err(e) => {
                            error!(
                                worker_id,
                                resume = %resume.file_name,
                                "scoring failed: {e}"
                            );
                            error_placeholder(&resume, &e)
                        }
                    };

                    results.lock().await.push(entry);

                    let current = {
                        let mut completed = completed.lock().await;
                        *completed += 1;
                        *completed
                    };
                    let _ = progress_tx.send(MatchProgress { current, total });
                }
            }));
        }

        // Completion means every worker drained the queue, including workers
        // still awaiting an in-flight scoring call.
        for handle in handles {
            handle
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("match worker panicked: {e}")))?;
        }

        stats.usage = *metrics.lock().await;
        stats.seal(Utc::now());

        let results = {
            let mut guard = results.lock().await;
            std::mem::take(&mut *guard)
        };

        Ok(MatchRun { results, stats })
    }
}

/// Placeholder for a resume the service scored but returned no matches for.
fn empty_placeholder(resume: &Resume) -> MatchResult {
    placeholder(
        resume,
        "Match failed".to_string(),
        "The AI service returned an empty match result. Retry later.".to_string(),
        Vec::new(),
    )
}

/// Placeholder for a resume whose scoring call failed outright.
fn error_placeholder(resume: &Resume, err: &AppError) -> MatchResult {
    placeholder(
        resume,
        "Match error".to_string(),
        format!("AI call failed: {err}"),
        vec![
            "Check your network connection".to_string(),
            "Retry later".to_string(),
        ],
    )
}

fn placeholder(
    resume: &Resume,
    jd_title: String,
    evaluation: String,
    improvement_suggestions: Vec<String>,
) -> MatchResult {
    MatchResult {
        resume_id: resume.id.clone(),
        resume_name: resume.candidate_name().to_string(),
        matches: vec![JDMatchDetail {
            jd_id: "error".to_string(),
            jd_title,
            score: 0.0,
            comprehensive_evaluation: evaluation,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            improvement_suggestions,
            is_best_match: false,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn resume(id: &str, status: ItemStatus) -> Resume {
        Resume {
            id: id.to_string(),
            file_name: format!("{id}.pdf"),
            file_type: "application/pdf".to_string(),
            raw_content: "raw".to_string(),
            parsed_data: None,
            status,
        }
    }

    fn job(id: &str) -> JobDescription {
        JobDescription {
            id: id.to_string(),
            title: format!("Job {id}"),
            file_name: "jobs.xlsx".to_string(),
            raw_content: "raw".to_string(),
            parsed_data: None,
        }
    }

    fn detail(jd_id: &str, score: f64, best: bool) -> JDMatchDetail {
        JDMatchDetail {
            jd_id: jd_id.to_string(),
            jd_title: format!("Job {jd_id}"),
            score,
            comprehensive_evaluation: "Strong platform background.".to_string(),
            strengths: vec![],
            weaknesses: vec![],
            improvement_suggestions: vec![],
            is_best_match: best,
        }
    }

    /// Scorer that succeeds for every resume, tracking peak concurrency.
    struct OkScorer {
        usage_per_call: CallUsage,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl OkScorer {
        fn new(usage_per_call: CallUsage) -> Self {
            Self {
                usage_per_call,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MatchScorer for OkScorer {
        async fn score(
            &self,
            resume: &Resume,
            jobs: &[JobDescription],
            _tier: ModelTier,
        ) -> Result<(MatchResult, CallUsage), AppError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let matches = vec![
                detail(&jobs[0].id, 72.0, true),
                detail(jobs.last().map(|j| j.id.as_str()).unwrap_or("jd"), 40.0, false),
            ];
            Ok((
                MatchResult {
                    resume_id: resume.id.clone(),
                    resume_name: "Candidate".to_string(),
                    matches,
                },
                self.usage_per_call,
            ))
        }
    }

    /// Scorer that fails for a chosen resume id.
    struct FlakyScorer {
        fail_id: String,
    }

    #[async_trait]
    impl MatchScorer for FlakyScorer {
        async fn score(
            &self,
            resume: &Resume,
            jobs: &[JobDescription],
            _tier: ModelTier,
        ) -> Result<(MatchResult, CallUsage), AppError> {
            if resume.id == self.fail_id {
                return Err(AppError::Scoring("boom".to_string()));
            }
            Ok((
                MatchResult {
                    resume_id: resume.id.clone(),
                    resume_name: "Candidate".to_string(),
                    matches: vec![detail(&jobs[0].id, 60.0, true)],
                },
                CallUsage::default(),
            ))
        }
    }

    #[tokio::test]
    async fn test_guardrails_reject_empty_and_oversized_selections() {
        assert!(MatchScheduler::validate_selection(0, 3).is_err());
        assert!(MatchScheduler::validate_selection(3, 0).is_err());
        assert!(MatchScheduler::validate_selection(6, 3).is_err());
        assert!(MatchScheduler::validate_selection(3, 6).is_err());
        assert!(MatchScheduler::validate_selection(5, 5).is_ok());
        assert!(MatchScheduler::validate_selection(1, 1).is_ok());
    }

    #[tokio::test]
    async fn test_oversized_run_is_rejected_before_any_scoring() {
        let scheduler = MatchScheduler::new(Arc::new(FlakyScorer {
            fail_id: "never".to_string(),
        }));
        let resumes: Vec<Resume> = (0..6)
            .map(|i| resume(&format!("r-{i}"), ItemStatus::Done))
            .collect();
        let err = scheduler
            .run(resumes, vec![job("jd-1")], ModelTier::Pro)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_every_done_resume_appears_exactly_once() {
        let scorer = Arc::new(OkScorer::new(CallUsage::default()));
        let scheduler = MatchScheduler::new(scorer);

        let resumes = vec![
            resume("r-1", ItemStatus::Done),
            resume("r-2", ItemStatus::Analyzing),
            resume("r-3", ItemStatus::Done),
            resume("r-4", ItemStatus::Error),
            resume("r-5", ItemStatus::Done),
        ];
        let run = scheduler
            .run(resumes, vec![job("jd-1"), job("jd-2")], ModelTier::Pro)
            .await
            .unwrap();

        let mut ids: Vec<&str> = run.results.iter().map(|r| r.resume_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["r-1", "r-3", "r-5"]);
    }

    #[tokio::test]
    async fn test_failed_resume_becomes_error_placeholder() {
        let scheduler = MatchScheduler::new(Arc::new(FlakyScorer {
            fail_id: "r-2".to_string(),
        }));
        let resumes = vec![
            resume("r-1", ItemStatus::Done),
            resume("r-2", ItemStatus::Done),
        ];
        let run = scheduler
            .run(resumes, vec![job("jd-1")], ModelTier::Flash)
            .await
            .unwrap();

        assert_eq!(run.results.len(), 2);
        let placeholder = run
            .results
            .iter()
            .find(|r| r.resume_id == "r-2")
            .expect("failed resume must stay in the report");
        assert_eq!(placeholder.matches.len(), 1);
        assert_eq!(placeholder.matches[0].jd_id, "error");
        assert_eq!(placeholder.matches[0].score, 0.0);
        assert!(!placeholder.matches[0].improvement_suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_the_pool_cap() {
        let scorer = Arc::new(OkScorer::new(CallUsage::default()));
        let scheduler = MatchScheduler::new(Arc::clone(&scorer) as Arc<dyn MatchScorer>);

        let resumes: Vec<Resume> = (0..5)
            .map(|i| resume(&format!("r-{i}"), ItemStatus::Done))
            .collect();
        scheduler
            .run(resumes, vec![job("jd-1")], ModelTier::Pro)
            .await
            .unwrap();

        assert!(scorer.peak.load(Ordering::SeqCst) <= MAX_CONCURRENT_MATCHES);
    }

    #[tokio::test]
    async fn test_progress_strictly_increases_to_total() {
        let scorer = Arc::new(OkScorer::new(CallUsage::default()));
        let scheduler = MatchScheduler::new(scorer);
        let (tx, mut rx) = watch::channel(MatchProgress::default());

        let observer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                seen.push(*rx.borrow());
            }
            seen
        });

        let resumes: Vec<Resume> = (0..4)
            .map(|i| resume(&format!("r-{i}"), ItemStatus::Done))
            .collect();
        let run = scheduler
            .run_with_progress(resumes, vec![job("jd-1")], ModelTier::Pro, tx)
            .await
            .unwrap();
        assert_eq!(run.results.len(), 4);

        let seen = observer.await.unwrap();
        // The watch channel may coalesce updates, but what is observed must
        // be strictly increasing and end at the total.
        for pair in seen.windows(2) {
            assert!(pair[1].current > pair[0].current);
        }
        assert_eq!(seen.last().map(|p| p.current), Some(4));
    }

    #[tokio::test]
    async fn test_usage_and_cost_accumulate_across_workers() {
        let per_call = CallUsage {
            prompt_tokens: 100_000,
            output_tokens: 10_000,
        };
        let scorer = Arc::new(OkScorer::new(per_call));
        let scheduler = MatchScheduler::new(scorer);

        let resumes: Vec<Resume> = (0..3)
            .map(|i| resume(&format!("r-{i}"), ItemStatus::Done))
            .collect();
        let run = scheduler
            .run(resumes, vec![job("jd-1")], ModelTier::Pro)
            .await
            .unwrap();

        assert_eq!(run.stats.usage.prompt_tokens, 300_000);
        assert_eq!(run.stats.usage.output_tokens, 30_000);
        let expected = 3.0 * (0.1 * 2.00 + 0.01 * 12.00);
        assert!((run.stats.usage.total_cost - expected).abs() < 1e-9);
        assert!(run.stats.end_time.is_some());
        assert!(run.stats.duration_ms >= 0);
    }

    #[tokio::test]
    async fn test_run_with_no_done_resume_is_rejected() {
        let scheduler = MatchScheduler::new(Arc::new(FlakyScorer {
            fail_id: "never".to_string(),
        }));
        let err = scheduler
            .run(
                vec![resume("r-1", ItemStatus::Analyzing)],
                vec![job("jd-1")],
                ModelTier::Pro,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
