//! Labelled data export
//!
//! Writes every stored document back to a file of the same kind as the
//! imported one: one column per stored column, in stored order, followed
//! by a trailing `label` column that is filled only for classified rows.
//! A source column already named `label` is replaced by that column.

mod delimited;
mod spreadsheet;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::import::FileKind;
use crate::models::{Column, Document, DocumentMetadata};
use crate::storage::StorageError;
use crate::store::Store;

/// Header of the appended label column
pub const LABEL_COLUMN: &str = "label";

/// Errors raised while exporting
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export. Import a file first.")]
    NothingToExport,

    #[error("Failed to create output directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// Match the imported file's type; CSV when it is unknown
    pub fn for_metadata(metadata: Option<&DocumentMetadata>) -> Self {
        match metadata.and_then(|m| FileKind::from_mime(&m.mime_type)) {
            Some(FileKind::Spreadsheet) => ExportFormat::Xlsx,
            _ => ExportFormat::Csv,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "labelled_data.xlsx",
            ExportFormat::Csv => "labelled_data.csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Xlsx => f.write_str("xlsx"),
            ExportFormat::Csv => f.write_str("csv"),
        }
    }
}

/// What an export wrote
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub rows: usize,
    pub labelled: usize,
}

/// Export all stored documents into `dir`
pub fn export_labelled(store: &Store, dir: &Path) -> Result<ExportSummary, ExportError> {
    let documents = store.get_all::<Document>()?;
    if documents.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let metadata = store.metadata()?;
    let format = ExportFormat::for_metadata(metadata.as_ref());
    let columns = column_names(&store.get_all::<Column>()?, &documents);

    std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format.file_name());

    match format {
        ExportFormat::Csv => delimited::write(&path, &columns, &documents).map_err(|source| {
            ExportError::Csv {
                path: path.clone(),
                source,
            }
        })?,
        ExportFormat::Xlsx => {
            spreadsheet::write(&path, &columns, &documents).map_err(|source| {
                ExportError::Spreadsheet {
                    path: path.clone(),
                    source,
                }
            })?
        }
    }

    let labelled = documents.iter().filter(|d| d.is_labelled()).count();
    info!(path = %path.display(), %format, rows = documents.len(), labelled, "Exported labelled data");

    Ok(ExportSummary {
        path,
        format,
        rows: documents.len(),
        labelled,
    })
}

/// Stored column order; falls back to the documents' own keys
///
/// Never includes [`LABEL_COLUMN`], which is always written last.
fn column_names(columns: &[Column], documents: &[Document]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    if !columns.is_empty() {
        names.extend(columns.iter().map(|c| c.name.clone()));
    } else {
        for key in documents.iter().flat_map(|d| d.fields.keys()) {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }
    names.retain(|name| name != LABEL_COLUMN);
    names
}

/// Header row: the data columns plus the label column
fn header(columns: &[String]) -> Vec<&str> {
    columns
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(LABEL_COLUMN))
        .collect()
}
