//! Spreadsheet (.xlsx) output
//!
//! Cells are written with their stored type; dates get a date format.

use std::path::Path;

use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet, XlsxError};

use super::header;
use crate::models::{CellValue, Document};

pub(super) fn write(
    path: &Path,
    columns: &[String],
    documents: &[Document],
) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col, name) in header(columns).into_iter().enumerate() {
        sheet.write_string(0, col_num(col)?, name)?;
    }

    for (i, document) in documents.iter().enumerate() {
        let row = RowNum::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;

        for (col, column) in columns.iter().enumerate() {
            if let Some(value) = document.get(column) {
                write_cell(sheet, row, col_num(col)?, value, &date_format)?;
            }
        }
        if let Some(label) = &document.label {
            sheet.write_string(row, col_num(columns.len())?, label)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: &CellValue,
    date_format: &Format,
) -> Result<(), XlsxError> {
    match value {
        CellValue::Text(s) => sheet.write_string(row, col, s)?,
        CellValue::Number(n) => sheet.write_number(row, col, *n)?,
        CellValue::Bool(b) => sheet.write_boolean(row, col, *b)?,
        CellValue::Date(d) => sheet.write_datetime_with_format(row, col, d, date_format)?,
    };
    Ok(())
}

fn col_num(index: usize) -> Result<ColNum, XlsxError> {
    ColNum::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}
