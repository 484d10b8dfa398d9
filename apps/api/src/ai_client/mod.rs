/// AI Client - the single point of entry for all external AI calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All AI interactions MUST go through this module.
///
/// Failures are surfaced to callers, never retried here: a scoring or parse
/// failure must stay visible per document instead of being papered over.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const API_PATH: &str = "v1beta/models";
/// Model for extraction and OCR calls. Scoring calls pick their model per
/// request via `ModelTier`.
pub const FLASH_MODEL: &str = "gemini-3-flash-preview";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("AI returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Default, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct AiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u64,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u64,
}

/// Token counts reported by the service for a single call.
pub use crate::models::matching::CallUsage;

impl AiResponse {
    /// Extracts the text of the first candidate's first text part.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.text.as_deref()))
            .filter(|t| !t.trim().is_empty())
    }

    pub fn usage(&self) -> CallUsage {
        let meta = self.usage_metadata.as_ref();
        CallUsage {
            prompt_tokens: meta.map(|m| m.prompt_token_count).unwrap_or(0),
            output_tokens: meta.map(|m| m.candidates_token_count).unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single AI client used by all services.
/// Rotates through a pool of API keys round-robin, one key per request.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    base_url: String,
    api_keys: Arc<Vec<String>>,
    next_key: Arc<AtomicUsize>,
}

impl AiClient {
    pub fn new(base_url: String, api_keys: Vec<String>) -> Self {
        assert!(!api_keys.is_empty(), "AiClient requires at least one key");
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            api_keys: Arc::new(api_keys),
            next_key: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn next_key(&self) -> &str {
        let idx = self.next_key.fetch_add(1, Ordering::Relaxed);
        &self.api_keys[idx % self.api_keys.len()]
    }

    /// Makes a structured-output call: the response is constrained to the
    /// given JSON schema and returned as raw JSON text plus token usage.
    pub async fn generate_structured(
        &self,
        model: &str,
        prompt: &str,
        schema: Value,
    ) -> Result<(String, CallUsage), AiError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: None,
                response_mime_type: Some("application/json"),
                response_schema: Some(schema),
            },
        };

        let response = self.send(model, &request).await?;
        let usage = response.usage();
        let text = response.text().ok_or(AiError::EmptyContent)?;
        Ok((strip_json_fences(text).to_string(), usage))
    }

    /// Extracts text from scanned page images (OCR). Images are base64 JPEG.
    pub async fn generate_vision_text(
        &self,
        images_base64: Vec<String>,
        instruction: &str,
    ) -> Result<String, AiError> {
        if images_base64.is_empty() {
            return Ok(String::new());
        }

        let mut parts: Vec<Part> = images_base64
            .into_iter()
            .map(|data| Part::InlineData {
                inline_data: InlineData {
                    mime_type: "image/jpeg",
                    data,
                },
            })
            .collect();
        parts.push(Part::Text {
            text: instruction.to_string(),
        });

        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: Some(0.0),
                ..Default::default()
            },
        };

        let response = self.send(FLASH_MODEL, &request).await?;
        Ok(response.text().unwrap_or_default().to_string())
    }

    async fn send(&self, model: &str, request: &GenerateRequest) -> Result<AiResponse, AiError> {
        let url = format!("{}/{}/{}:generateContent", self.base_url, API_PATH, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.next_key())
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let ai_response: AiResponse = response.json().await?;

        debug!(
            "AI call succeeded: model={}, prompt_tokens={}, output_tokens={}",
            model,
            ai_response.usage().prompt_tokens,
            ai_response.usage().output_tokens
        );

        Ok(ai_response)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from AI output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
