use serde::{Deserialize, Serialize};

/// Requirements block of a parsed job description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequirements {
    pub education: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub abilities: Vec<String>,
}

/// Structured fields extracted from a job description by the AI service.
///
/// `key_clarification` is the recruiter-confirmed override of the generic
/// requirements. When a spreadsheet row supplies one AND the AI infers one,
/// the row-supplied value wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JDParsedInfo {
    #[serde(default)]
    pub job_code: String,
    pub title: String,
    #[serde(default)]
    pub key_clarification: String,
    pub description: String,
    pub responsibilities: Vec<String>,
    pub requirements: JobRequirements,
}

/// A job opening flowing through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub id: String,
    pub title: String,
    pub file_name: String,
    pub raw_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<JDParsedInfo>,
}

/// One spreadsheet row of the batch job-description import.
/// `row_index` ties the AI response back to its source row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJdRow {
    pub row_index: usize,
    pub job_code: String,
    pub title: String,
    pub raw_content: String,
    pub key_clarification: String,
}

/// A batch-parse result, tagged with the row it answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJdParsed {
    pub row_index: usize,
    #[serde(flatten)]
    pub parsed: JDParsedInfo,
}
