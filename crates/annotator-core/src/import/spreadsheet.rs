//! Spreadsheet (.xlsx) input
//!
//! Only the first worksheet is read. Cells keep their spreadsheet type.

use std::path::Path;

use calamine::{open_workbook, Data, DataType, Reader, Xlsx, XlsxError};

use super::ImportError;
use crate::models::{CellValue, Document};

pub(super) fn read(path: &Path) -> Result<(Vec<String>, Vec<Document>), ImportError> {
    let invalid = |details: String| ImportError::Spreadsheet {
        path: path.to_path_buf(),
        details,
    };

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: XlsxError| invalid(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| invalid("workbook has no worksheets".to_string()))?
        .map_err(|e| invalid(e.to_string()))?;

    let mut rows = range.rows();
    let mut header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|cell| cell.to_string()).collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };
    // Wide data rows can pad the header with empty cells
    while header.last().is_some_and(|name| name.trim().is_empty()) {
        header.pop();
    }

    let mut documents = Vec::new();
    for row in rows {
        let fields: Vec<(String, CellValue)> = header
            .iter()
            .zip(row.iter())
            .filter_map(|(column, cell)| cell_value(cell).map(|v| (column.clone(), v)))
            .collect();

        if fields.iter().all(|(_, value)| value.is_blank()) {
            continue;
        }
        documents.push(Document::from_fields(fields));
    }

    Ok((header, documents))
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(
            cell.as_datetime()
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::Text(cell.to_string())),
        ),
        other => Some(CellValue::Text(other.to_string())),
    }
}
