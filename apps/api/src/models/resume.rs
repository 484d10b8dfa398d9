use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Parse lifecycle of an uploaded document.
/// Transitions happen only inside the ingestion pipeline, never in handlers
/// that merely read records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Analyzing,
    Done,
    Error,
}

/// Structured fields extracted from a resume by the AI service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeParsedInfo {
    pub name: String,
    pub education: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub summary: String,
}

/// A candidate resume flowing through the pipeline.
///
/// `raw_content` is immutable once set: the record is created as an empty
/// `analyzing` placeholder and completed (or failed) exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub raw_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<ResumeParsedInfo>,
    pub status: ItemStatus,
}

impl Resume {
    /// Optimistic placeholder created the moment a file arrives.
    pub fn analyzing(file_name: String, file_type: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_name,
            file_type,
            raw_content: String::new(),
            parsed_data: None,
            status: ItemStatus::Analyzing,
        }
    }

    /// Seals the record after successful extraction.
    pub fn complete(&mut self, raw_content: String, parsed: ResumeParsedInfo) {
        self.raw_content = raw_content;
        self.parsed_data = Some(parsed);
        self.status = ItemStatus::Done;
    }

    pub fn fail(&mut self) {
        self.status = ItemStatus::Error;
    }

    pub fn candidate_name(&self) -> &str {
        self.parsed_data
            .as_ref()
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown candidate")
    }
}
