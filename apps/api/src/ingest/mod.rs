//! Document Ingestion Pipeline.
//!
//! Per-document stages run strictly in order: format detection, text
//! extraction, OCR fallback (PDFs only), then structured extraction by the
//! caller. Across documents there is no ordering guarantee.
//!
//! Contract: `extract_text` returns plain text for every supported format,
//! `UnsupportedFormat` for unrecognized extensions, and `Decode` for corrupt
//! binary content. OCR failures degrade to empty text instead of propagating,
//! so callers must treat empty extracted text as a reportable degraded
//! success, not a hard error.

pub mod docx;
pub mod handlers;
pub mod pdf;
pub mod sheet;
pub mod text;

use async_trait::async_trait;

use crate::ai_client::{prompts::OCR_INSTRUCTION, AiClient};
use crate::errors::AppError;

/// OCR capability seam. Implemented by the AI client's vision call;
/// swapped for a stub in tests.
///
/// Carried as `&dyn OcrEngine` through the pipeline.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extracts text from base64-encoded JPEG page images.
    async fn recognize(&self, images_base64: Vec<String>) -> Result<String, AppError>;
}

#[async_trait]
impl OcrEngine for AiClient {
    async fn recognize(&self, images_base64: Vec<String>) -> Result<String, AppError> {
        self.generate_vision_text(images_base64, OCR_INSTRUCTION)
            .await
            .map_err(|e| AppError::Ai(e.to_string()))
    }
}

/// Lowercased extension of a file name, if it has one.
pub fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Extracts plain text from an uploaded file, dispatching on its extension.
pub async fn extract_text(
    file_name: &str,
    bytes: &[u8],
    ocr: &dyn OcrEngine,
) -> Result<String, AppError> {
    let extension = file_extension(file_name)
        .ok_or_else(|| AppError::UnsupportedFormat(file_name.to_string()))?;

    tracing::debug!(file = file_name, ext = %extension, "extracting text");

    match extension.as_str() {
        "txt" => Ok(text::decode_text(bytes)),
        "docx" => docx::extract_docx_text(bytes),
        "doc" => docx::extract_legacy_doc_text(bytes),
        "xlsx" | "xls" => sheet::extract_sheet_text(bytes),
        "pdf" => pdf::extract_pdf_text(bytes, ocr).await,
        other => Err(AppError::UnsupportedFormat(other.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// OCR stub returning a fixed string, or an error when `fail` is set.
    pub struct StubOcr {
        pub text: String,
        pub fail: bool,
    }

    #[async_trait]
    impl OcrEngine for StubOcr {
        async fn recognize(&self, _images: Vec<String>) -> Result<String, AppError> {
            if self.fail {
                Err(AppError::Ai("ocr unavailable".into()))
            } else {
                Ok(self.text.clone())
            }
        }
    }
}
