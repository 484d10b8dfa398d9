use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reasoning model used for scoring calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelTier {
    #[serde(rename = "gemini-3-flash-preview")]
    Flash,
    #[default]
    #[serde(rename = "gemini-3-pro-preview")]
    Pro,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Flash => "gemini-3-flash-preview",
            ModelTier::Pro => "gemini-3-pro-preview",
        }
    }
}

/// One scored job within a resume's match report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JDMatchDetail {
    pub jd_id: String,
    pub jd_title: String,
    pub score: f64,
    pub comprehensive_evaluation: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub is_best_match: bool,
}

/// Ranked match report for one resume against the selected jobs.
/// `matches` is sorted descending by score and capped at 3 entries by the
/// extraction adapter's contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub resume_id: String,
    pub resume_name: String,
    pub matches: Vec<JDMatchDetail>,
}

/// Token counts reported by the AI service for a single call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallUsage {
    pub prompt_tokens: u64,
    pub output_tokens: u64,
}

/// Monotonically non-decreasing usage accumulator for one matching run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetrics {
    pub prompt_tokens: u64,
    pub output_tokens: u64,
    pub total_cost: f64,
}

/// Wall-clock bookkeeping for one matching run. `end_time` stays `None`
/// until every scheduled worker has drained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: i64,
    pub usage: UsageMetrics,
}

impl TaskStats {
    pub fn started(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: None,
            duration_ms: 0,
            usage: UsageMetrics::default(),
        }
    }

    pub fn seal(&mut self, end_time: DateTime<Utc>) {
        self.end_time = Some(end_time);
        self.duration_ms = (end_time - self.start_time).num_milliseconds();
    }
}

/// Live progress of a matching run. `current` only ever increases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchProgress {
    pub current: usize,
    pub total: usize,
}
