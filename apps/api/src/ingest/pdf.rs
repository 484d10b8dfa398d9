//! PDF extraction with an OCR fallback for image-based documents.
//!
//! First pass extracts the text layer per page. When no page carries a
//! substantial text layer the document is classified image-based: the
//! earliest pages are rasterized, JPEG-encoded, and routed through the OCR
//! capability. OCR failure degrades to empty text; extraction never errors
//! just because a PDF is image-based.

use std::io::Cursor;
use std::process::Command;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::ingest::OcrEngine;

/// A page with less extracted text than this is considered image-only.
const MIN_TEXT_THRESHOLD: usize = 50;
/// Pages rasterized for OCR are capped to bound cost and payload size.
const MAX_OCR_PAGES: usize = 5;
/// 1.5x scale over the 72 DPI PDF user-space baseline.
const OCR_RENDER_DPI: u32 = 108;
const JPEG_QUALITY: u8 = 80;

/// Prefix marking OCR-derived content in the extracted text.
pub const OCR_TAG: &str = "[OCR]:\n";

/// Extracts plain text from a PDF, falling back to OCR for scanned documents.
pub async fn extract_pdf_text(bytes: &[u8], ocr: &dyn OcrEngine) -> Result<String, AppError> {
    let pages = extract_page_texts(bytes)?;
    let text = pages.join("\n");

    if is_image_based(&pages) {
        debug!("PDF classified image-based, routing through OCR");

        let pdf_bytes = bytes.to_vec();
        let images = tokio::task::spawn_blocking(move || render_pages_to_jpeg(&pdf_bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("render task panicked: {e}")))?
            .unwrap_or_else(|e| {
                warn!("page rasterization failed: {e}");
                Vec::new()
            });

        let ocr_text = match ocr.recognize(images).await {
            Ok(t) => t,
            Err(e) => {
                warn!("OCR failed, degrading to extracted text: {e}");
                String::new()
            }
        };

        if !ocr_text.trim().is_empty() {
            return Ok(format!("{OCR_TAG}{ocr_text}"));
        }
    }

    Ok(text)
}

/// Text of each page, in page order.
fn extract_page_texts(bytes: &[u8]) -> Result<Vec<String>, AppError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| AppError::Decode(format!("Failed to parse PDF: {e}")))?;

    let mut page_numbers: Vec<u32> = doc.get_pages().keys().cloned().collect();
    page_numbers.sort();

    Ok(page_numbers
        .iter()
        .map(|page| doc.extract_text(&[*page]).unwrap_or_default())
        .collect())
}

/// A PDF is image-based when no single page clears the text threshold OR the
/// aggregate text is below it.
fn is_image_based(pages: &[String]) -> bool {
    let any_page_substantial = pages
        .iter()
        .any(|p| p.trim().chars().count() > MIN_TEXT_THRESHOLD);
    let aggregate: usize = pages.iter().map(|p| p.trim().chars().count()).sum();

    !any_page_substantial || aggregate < MIN_TEXT_THRESHOLD
}

/// Rasterizes the earliest pages to base64 JPEG via `pdftoppm`.
///
/// Rendering is best-effort: a missing `pdftoppm` binary or a render failure
/// yields an error the caller downgrades to "no images", which the OCR stage
/// already tolerates.
fn render_pages_to_jpeg(pdf_bytes: &[u8]) -> anyhow::Result<Vec<String>> {
    let dir = tempfile::tempdir()?;
    let pdf_path = dir.path().join("source.pdf");
    std::fs::write(&pdf_path, pdf_bytes)?;
    let prefix = dir.path().join("page");

    let status = Command::new("pdftoppm")
        .arg("-png")
        .arg("-r")
        .arg(OCR_RENDER_DPI.to_string())
        .arg("-f")
        .arg("1")
        .arg("-l")
        .arg(MAX_OCR_PAGES.to_string())
        .arg(&pdf_path)
        .arg(&prefix)
        .status()?;
    if !status.success() {
        anyhow::bail!("pdftoppm exited with {status}");
    }

    let mut page_files: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
        .collect();
    page_files.sort();

    let mut images = Vec::with_capacity(page_files.len());
    for path in page_files.iter().take(MAX_OCR_PAGES) {
        let png = std::fs::read(path)?;
        let rendered = image::load_from_memory(&png)?;

        let mut jpeg = Vec::new();
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), JPEG_QUALITY);
        rendered.write_with_encoder(encoder)?;

        images.push(BASE64.encode(&jpeg));
    }

    debug!("rasterized {} pages for OCR", images.len());
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::test_support::StubOcr;
    use lopdf::{dictionary, Document, Object, Stream};

    /// Builds a minimal PDF with one page of text per entry.
    fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let pages_id = doc.new_object_id();
        let mut page_ids = Vec::new();

        for text in page_texts {
            let escaped = text
                .replace('\\', "\\\\")
                .replace('(', "\\(")
                .replace(')', "\\)");
            let content = format!("BT /F1 12 Tf 100 700 Td ({escaped}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    const LONG_LINE: &str =
        "Seasoned backend engineer with a decade of experience building services in Rust";

    #[test]
    fn test_extract_page_texts_in_page_order() {
        let bytes = build_pdf(&["first page", "second page"]);
        let pages = extract_page_texts(&bytes).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("first page"));
        assert!(pages[1].contains("second page"));
    }

    #[test]
    fn test_garbage_bytes_are_a_decode_error() {
        let err = extract_page_texts(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_short_pages_classify_as_image_based() {
        let pages = vec!["tiny".to_string(), "also tiny".to_string()];
        assert!(is_image_based(&pages));
    }

    #[test]
    fn test_substantial_page_classifies_as_text_based() {
        let pages = vec![LONG_LINE.to_string(), String::new()];
        assert!(!is_image_based(&pages));
    }

    #[test]
    fn test_no_pages_classify_as_image_based() {
        assert!(is_image_based(&[]));
    }

    #[tokio::test]
    async fn test_image_based_pdf_takes_ocr_text() {
        let bytes = build_pdf(&["x"]);
        let ocr = StubOcr {
            text: "Recovered resume text".into(),
            fail: false,
        };
        let text = extract_pdf_text(&bytes, &ocr).await.unwrap();
        assert!(text.starts_with(OCR_TAG));
        assert!(text.contains("Recovered resume text"));
    }

    #[tokio::test]
    async fn test_ocr_failure_degrades_to_extracted_text() {
        let bytes = build_pdf(&["x"]);
        let ocr = StubOcr {
            text: String::new(),
            fail: true,
        };
        // Extraction must not propagate the OCR failure.
        let text = extract_pdf_text(&bytes, &ocr).await.unwrap();
        assert!(!text.starts_with(OCR_TAG));
    }

    #[tokio::test]
    async fn test_text_pdf_skips_ocr_entirely() {
        let bytes = build_pdf(&[LONG_LINE]);
        // A failing OCR engine proves the branch was never taken.
        let ocr = StubOcr {
            text: String::new(),
            fail: true,
        };
        let text = extract_pdf_text(&bytes, &ocr).await.unwrap();
        assert!(text.contains("Seasoned backend engineer"));
    }
}
