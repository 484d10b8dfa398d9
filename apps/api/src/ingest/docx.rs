//! Word-processor document extraction.
//!
//! DOCX is a zip archive; the document body lives in `word/document.xml`.
//! Text runs (`<w:t>`) are streamed out with a newline per paragraph
//! (`<w:p>`), which is all the structure downstream extraction needs.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::AppError;

/// Extracts raw text from a DOCX file.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, AppError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::Decode(format!("Failed to open DOCX archive: {e}")))?;

    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Decode(format!("DOCX has no document.xml: {e}")))?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| AppError::Decode(format!("Failed to read document.xml: {e}")))?;

    parse_document_xml(&xml_content)
}

/// Extracts text from a legacy `.doc` upload.
///
/// Many "legacy" files are modern DOCX content behind an old extension, so
/// the DOCX reader is attempted first. A genuine binary .doc fails that read
/// and gets a descriptive error instead of garbage text.
pub fn extract_legacy_doc_text(bytes: &[u8]) -> Result<String, AppError> {
    extract_docx_text(bytes).map_err(|_| {
        AppError::Decode(
            "Cannot parse a legacy binary .doc file directly. \
             Re-save it as .docx or PDF and upload again."
                .to_string(),
        )
    })
}

fn parse_document_xml(xml: &str) -> Result<String, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut text = String::new();
    let mut in_text_element = false;
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = true,
                b"p" => in_paragraph = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" => {
                    if in_paragraph {
                        text.push('\n');
                        in_paragraph = false;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e.xml_content().unwrap_or_default();
                    text.push_str(&decoded);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::Decode(format!("XML parsing error: {e}")));
            }
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:body>
                <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
                <w:p><w:r><w:t>Senior Engineer</w:t></w:r></w:p>
            </w:body>
        </w:document>"#;

    #[test]
    fn test_extracts_runs_with_paragraph_breaks() {
        let bytes = build_docx(SAMPLE_XML);
        let text = extract_docx_text(&bytes).unwrap();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Senior Engineer"));
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_non_zip_bytes_are_a_decode_error() {
        let err = extract_docx_text(b"\xd0\xcf\x11\xe0 legacy binary").unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_disguised_doc_parses_via_docx_reader() {
        let bytes = build_docx(SAMPLE_XML);
        let text = extract_legacy_doc_text(&bytes).unwrap();
        assert!(text.contains("Jane Doe"));
    }

    #[test]
    fn test_genuine_binary_doc_gets_resave_hint() {
        let err = extract_legacy_doc_text(b"\xd0\xcf\x11\xe0 legacy binary").unwrap_err();
        let AppError::Decode(msg) = err else {
            panic!("expected decode error");
        };
        assert!(msg.contains(".docx or PDF"));
    }
}
