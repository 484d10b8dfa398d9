//! Spreadsheet extraction and the batch job-description import.
//!
//! Two consumers: `extract_sheet_text` dumps every sheet as CSV-ish text for
//! generic extraction (CSV keeps the structure visible to the AI service),
//! and `collect_jd_rows` implements the batch import contract: row 0 is a
//! header, each later row is one job-description record.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::BatchJdRow;

const UNTITLED_POSITION: &str = "Untitled position";

/// Dumps all sheets of a workbook as plain text, one CSV block per sheet.
pub fn extract_sheet_text(bytes: &[u8]) -> Result<String, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::Decode(format!("Failed to open spreadsheet: {e}")))?;

    let mut full_content = String::new();
    for name in workbook.sheet_names().to_owned() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| AppError::Decode(format!("Failed to read sheet '{name}': {e}")))?;

        full_content.push_str(&format!("--- Sheet: {name} ---\n"));
        for row in range.rows() {
            let line: Vec<String> = row.iter().map(cell_to_string).collect();
            full_content.push_str(&line.join(","));
            full_content.push('\n');
        }
        full_content.push('\n');
    }

    Ok(full_content)
}

/// Reads the first sheet and maps data rows into batch import rows.
pub fn collect_jd_rows(bytes: &[u8]) -> Result<Vec<BatchJdRow>, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::Decode(format!("Failed to open spreadsheet: {e}")))?;

    let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| AppError::Decode(format!("Failed to read sheet '{first_sheet}': {e}")))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(map_jd_rows(&rows))
}

/// Maps raw sheet rows into batch rows.
///
/// Row 0 is the header. Cells 0..4 (non-empty only) concatenate into the raw
/// description; cell 4 is the explicit key clarification and wins over
/// anything the AI later infers. Rows with no non-empty cells are skipped.
pub fn map_jd_rows(rows: &[Vec<String>]) -> Vec<BatchJdRow> {
    let mut batch = Vec::new();

    for (row_index, row) in rows.iter().enumerate().skip(1) {
        let raw_content = row
            .iter()
            .take(4)
            .filter(|cell| !cell.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        if raw_content.trim().is_empty() {
            continue;
        }

        let job_code = row
            .first()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let title = row
            .get(1)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| UNTITLED_POSITION.to_string());
        let key_clarification = row.get(4).cloned().unwrap_or_default();

        batch.push(BatchJdRow {
            row_index,
            job_code,
            title,
            raw_content,
            key_clarification,
        });
    }

    batch
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
