//! CSV input

use std::path::Path;

use csv::ReaderBuilder;

use super::ImportError;
use crate::models::{CellValue, Document};

/// Read the header row and every non-blank data row
///
/// Cells stay text; short rows simply lack the trailing columns.
pub(super) fn read(path: &Path) -> Result<(Vec<String>, Vec<Document>), ImportError> {
    let csv_error = |source| ImportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut header: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    // Trailing commas leave empty names at the end of the header
    while header.last().is_some_and(|name| name.trim().is_empty()) {
        header.pop();
    }

    let mut documents = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let fields = header
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column.clone(), CellValue::from(cell)));
        documents.push(Document::from_fields(fields));
    }

    Ok((header, documents))
}
