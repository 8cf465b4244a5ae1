//! Identifier extraction from tabular uploads
//!
//! Turns an uploaded CSV or XLSX file into the ordered sequence of
//! non-empty, trimmed values found in the configured address column.
//! Rows where the column is missing or blank are skipped. Only a
//! structurally unreadable file is an error; zero extracted identifiers
//! is a caller-visible condition, not a parser fault.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::debug;
use trust_common::Error;

/// Extract ordered identifiers from an uploaded file.
///
/// Format is dispatched on the file name extension: `.csv` uses the CSV
/// reader, `.xlsx`/`.xls` the spreadsheet reader. The upload is consumed
/// from memory; nothing is written to disk.
pub fn extract_identifiers(
    file_name: &str,
    bytes: &[u8],
    column: &str,
) -> Result<Vec<String>, Error> {
    let extension = file_name
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let identifiers = match extension.as_str() {
        "csv" => extract_from_csv(bytes, column)?,
        "xlsx" | "xls" => extract_from_workbook(bytes, column)?,
        other => {
            return Err(Error::Parse(format!(
                "Unsupported file type: .{} (expected .csv or .xlsx)",
                other
            )))
        }
    };

    debug!(
        file_name = %file_name,
        column = %column,
        count = identifiers.len(),
        "Identifier extraction complete"
    );

    Ok(identifiers)
}

/// Extract from CSV bytes: header row names the columns
fn extract_from_csv(bytes: &[u8], column: &str) -> Result<Vec<String>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| Error::Parse(format!("Unreadable CSV header: {}", e)))?;
    let column_index = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column));

    // No matching column: every row skips it, yielding zero identifiers.
    let Some(column_index) = column_index else {
        return Ok(Vec::new());
    };

    let mut identifiers = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Parse(format!("Unreadable CSV row: {}", e)))?;
        if let Some(value) = record.get(column_index) {
            let value = value.trim();
            if !value.is_empty() {
                identifiers.push(value.to_string());
            }
        }
    }

    Ok(identifiers)
}

/// Extract from XLSX/XLS bytes: first sheet, first row names the columns
fn extract_from_workbook(bytes: &[u8], column: &str) -> Result<Vec<String>, Error> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| Error::Parse(format!("Unreadable workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Parse("Workbook has no sheets".to_string()))?
        .map_err(|e| Error::Parse(format!("Unreadable sheet: {}", e)))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };

    let column_index = header_row
        .iter()
        .position(|cell| cell_text(cell).trim().eq_ignore_ascii_case(column));
    let Some(column_index) = column_index else {
        return Ok(Vec::new());
    };

    let mut identifiers = Vec::new();
    for row in rows {
        if let Some(cell) = row.get(column_index) {
            let value = cell_text(cell);
            let value = value.trim();
            if !value.is_empty() {
                identifiers.push(value.to_string());
            }
        }
    }

    Ok(identifiers)
}

/// Render a spreadsheet cell as text; empty and error cells yield ""
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
