//! Structured Extraction Adapter.
//!
//! Wraps the AI capability with schema-constrained operations: the adapter
//! owns the instruction, the schema contract, and response-shape validation.
//! Schema enforcement happens service-side; parsing here is the last line of
//! defense against empty or truncated responses.

pub mod handlers;
pub mod prompts;
pub mod schemas;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use crate::ai_client::{AiClient, AiError, CallUsage, FLASH_MODEL};
use crate::errors::AppError;
use crate::matching::scheduler::MatchScorer;
use crate::models::job::{BatchJdParsed, BatchJdRow, JDParsedInfo, JobDescription};
use crate::models::matching::{MatchResult, ModelTier};
use crate::models::resume::{Resume, ResumeParsedInfo};

fn current_date() -> String {
    Utc::now().format("%B %d, %Y").to_string()
}

fn map_ai_err(err: AiError) -> AppError {
    match err {
        AiError::EmptyContent => AppError::EmptyAiResponse,
        other => AppError::Ai(other.to_string()),
    }
}

/// Extracts structured resume fields from plain text.
pub async fn extract_resume_fields(
    text: &str,
    ai: &AiClient,
) -> Result<ResumeParsedInfo, AppError> {
    let prompt = prompts::RESUME_PARSE_PROMPT
        .replace("{current_date}", &current_date())
        .replace("{content}", text);

    let (json_text, _usage) = ai
        .generate_structured(FLASH_MODEL, &prompt, schemas::resume_schema())
        .await
        .map_err(map_ai_err)?;

    serde_json::from_str(&json_text).map_err(|e| AppError::MalformedResponse(e.to_string()))
}

/// Extracts every job description found in plain text.
///
/// Empty or unparseable responses return an empty list instead of failing the
/// caller: one bad document must not abort an import run. Transport failures
/// still propagate.
pub async fn extract_job_fields(
    text: &str,
    ai: &AiClient,
) -> Result<Vec<JDParsedInfo>, AppError> {
    let prompt = prompts::JD_PARSE_PROMPT.replace("{content}", text);

    let json_text = match ai
        .generate_structured(FLASH_MODEL, &prompt, schemas::jd_list_schema())
        .await
    {
        Ok((json_text, _usage)) => json_text,
        Err(AiError::EmptyContent) => return Ok(Vec::new()),
        Err(other) => return Err(map_ai_err(other)),
    };

    Ok(parse_jd_list(&json_text))
}

/// Parses all batch rows in a single service call.
///
/// Results come back tagged by `rowIndex`; indices missing from the response
/// are the caller's failure count, not retried here.
pub async fn extract_job_fields_batch(
    rows: &[BatchJdRow],
    ai: &AiClient,
) -> Result<Vec<BatchJdParsed>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let batch_json = serde_json::to_string_pretty(rows)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode batch rows: {e}")))?;
    let prompt = prompts::JD_BATCH_PARSE_PROMPT.replace("{batch_json}", &batch_json);

    let json_text = match ai
        .generate_structured(FLASH_MODEL, &prompt, schemas::jd_batch_schema())
        .await
    {
        Ok((json_text, _usage)) => json_text,
        Err(AiError::EmptyContent) => {
            warn!("batch JD parse returned no content");
            return Ok(Vec::new());
        }
        Err(other) => return Err(map_ai_err(other)),
    };

    match serde_json::from_str(&json_text) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            warn!("batch JD parse returned unparseable content: {e}");
            Ok(Vec::new())
        }
    }
}

/// Scores one resume against the selected jobs.
///
/// Returns the ranked match report plus the call's token usage. Scoring
/// failures are never silently degraded: they surface per resume.
pub async fn score_match(
    resume: &Resume,
    jobs: &[JobDescription],
    tier: ModelTier,
    ai: &AiClient,
) -> Result<(MatchResult, CallUsage), AppError> {
    let jd_descriptions = jobs
        .iter()
        .map(jd_block)
        .collect::<Vec<_>>()
        .join("\n\n====================\n\n");

    let prompt = prompts::MATCH_PROMPT
        .replace("{current_date}", &current_date())
        .replace("{resume_text}", &resume.raw_content)
        .replace("{jd_count}", &jobs.len().to_string())
        .replace("{jd_descriptions}", &jd_descriptions);

    let (json_text, usage) = ai
        .generate_structured(tier.as_str(), &prompt, schemas::match_schema())
        .await
        .map_err(|e| match e {
            AiError::EmptyContent => AppError::EmptyAiResponse,
            other => AppError::Scoring(other.to_string()),
        })?;

    let result = parse_match_response(&json_text, resume)?;
    Ok((result, usage))
}

fn jd_block(jd: &JobDescription) -> String {
    let parsed = jd.parsed_data.as_ref();
    let key_clarification = parsed
        .map(|p| p.key_clarification.as_str())
        .filter(|k| !k.is_empty())
        .unwrap_or("None");
    let responsibilities = parsed
        .map(|p| p.responsibilities.join("; "))
        .unwrap_or_default();
    let requirements = parsed
        .and_then(|p| serde_json::to_string(&p.requirements).ok())
        .unwrap_or_default();

    prompts::MATCH_JD_BLOCK
        .replace("{jd_id}", &jd.id)
        .replace("{jd_title}", &jd.title)
        .replace("{key_clarification}", key_clarification)
        .replace("{responsibilities}", &responsibilities)
        .replace("{requirements}", &requirements)
}

/// Tolerant list parse: anything unparseable becomes an empty list.
fn parse_jd_list(json_text: &str) -> Vec<JDParsedInfo> {
    match serde_json::from_str(json_text) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("JD parse returned unparseable content: {e}");
            Vec::new()
        }
    }
}

/// Validates the scoring response shape and restores the invariants the
/// service cannot be trusted with: ids re-stamped from the input resume,
/// matches sorted descending by score and capped at 3.
fn parse_match_response(json_text: &str, resume: &Resume) -> Result<MatchResult, AppError> {
    let mut result: MatchResult =
        serde_json::from_str(json_text).map_err(|e| AppError::Scoring(e.to_string()))?;

    result.resume_id = resume.id.clone();
    result.resume_name = resume.candidate_name().to_string();
    result
        .matches
        .sort_by(|a, b| b.score.total_cmp(&a.score));
    result.matches.truncate(3);

    Ok(result)
}

/// Production scorer backing the matching scheduler.
/// Carried in `AppState` as `Arc<dyn MatchScorer>`.
pub struct AiMatchScorer {
    pub ai: AiClient,
}

#[async_trait]
impl MatchScorer for AiMatchScorer {
    async fn score(
        &self,
        resume: &Resume,
        jobs: &[JobDescription],
        tier: ModelTier,
    ) -> Result<(MatchResult, CallUsage), AppError> {
        score_match(resume, jobs, tier, &self.ai).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ItemStatus;

    fn done_resume() -> Resume {
        Resume {
            id: "r-1".into(),
            file_name: "cv.pdf".into(),
            file_type: "application/pdf".into(),
            raw_content: "raw".into(),
            parsed_data: Some(ResumeParsedInfo {
                name: "Jane Doe".into(),
                education: "BSc".into(),
                skills: vec![],
                experience: "Acme".into(),
                summary: "Engineer".into(),
            }),
            status: ItemStatus::Done,
        }
    }

    fn detail_json(jd_id: &str, score: f64, best: bool) -> String {
        format!(
            r#"{{"jdId": "{jd_id}", "jdTitle": "t", "score": {score},
                "comprehensiveEvaluation": "Solid platform background.",
                "strengths": [], "weaknesses": [], "improvementSuggestions": [],
                "isBestMatch": {best}}}"#
        )
    }

    #[test]
    fn test_match_response_is_sorted_and_restamped() {
        let json = format!(
            r#"{{"resumeId": "wrong", "resumeName": "wrong",
                "matches": [{}, {}, {}]}}"#,
            detail_json("jd-low", 40.0, false),
            detail_json("jd-high", 72.0, true),
            detail_json("jd-mid", 55.0, false),
        );

        let result = parse_match_response(&json, &done_resume()).unwrap();
        assert_eq!(result.resume_id, "r-1");
        assert_eq!(result.resume_name, "Jane Doe");
        let scores: Vec<f64> = result.matches.iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![72.0, 55.0, 40.0]);
        assert!(result.matches[0].is_best_match);
    }

    #[test]
    fn test_match_response_is_capped_at_three() {
        let details: Vec<String> = (0..5)
            .map(|i| detail_json(&format!("jd-{i}"), i as f64 * 10.0, false))
            .collect();
        let json = format!(
            r#"{{"resumeId": "x", "resumeName": "x", "matches": [{}]}}"#,
            details.join(",")
        );

        let result = parse_match_response(&json, &done_resume()).unwrap();
        assert_eq!(result.matches.len(), 3);
        assert_eq!(result.matches[0].score, 40.0);
    }

    #[test]
    fn test_unparseable_match_response_is_a_scoring_failure() {
        let err = parse_match_response("not json", &done_resume()).unwrap_err();
        assert!(matches!(err, AppError::Scoring(_)));
    }

    #[test]
    fn test_unparseable_jd_list_degrades_to_empty() {
        assert!(parse_jd_list("oops").is_empty());
        assert!(parse_jd_list("{}").is_empty());
    }

    #[test]
    fn test_jd_block_marks_missing_clarification() {
        let jd = JobDescription {
            id: "jd-9".into(),
            title: "Backend Engineer".into(),
            file_name: "jd.txt".into(),
            raw_content: "raw".into(),
            parsed_data: Some(JDParsedInfo {
                job_code: "REQ-9".into(),
                title: "Backend Engineer".into(),
                key_clarification: String::new(),
                description: "Builds services".into(),
                responsibilities: vec!["Design".into(), "Review".into()],
                requirements: Default::default(),
            }),
        };

        let block = jd_block(&jd);
        assert!(block.contains("[Job ID: jd-9]"));
        assert!(block.contains("<<<: None"));
        assert!(block.contains("Design; Review"));
    }
}
