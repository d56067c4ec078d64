//! File import
//!
//! Parses a spreadsheet or CSV file into documents and an unselected
//! column list. The first row is the header row. Parsing never touches
//! the store; the result is handed to [`crate::prepare::ImportPlan`].

mod delimited;
mod spreadsheet;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::{Column, Document, DocumentMetadata};

/// MIME type of `.xlsx` workbooks
pub const SPREADSHEET_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type of `.csv` files
pub const CSV_MIME: &str = "text/csv";

/// Supported input kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Spreadsheet,
    Csv,
}

impl FileKind {
    /// Resolve a kind from a MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            SPREADSHEET_MIME => Some(FileKind::Spreadsheet),
            CSV_MIME => Some(FileKind::Csv),
            _ => None,
        }
    }

    /// Resolve a kind from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(FileKind::Spreadsheet),
            "csv" => Some(FileKind::Csv),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            FileKind::Spreadsheet => SPREADSHEET_MIME,
            FileKind::Csv => CSV_MIME,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Spreadsheet => f.write_str("spreadsheet"),
            FileKind::Csv => f.write_str("csv"),
        }
    }
}

/// Errors raised while reading an input file
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported file type for '{path}'. Please upload an Excel (.xlsx) or CSV (.csv) file.")]
    UnsupportedFileType { path: PathBuf },

    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CSV in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid spreadsheet '{path}': {details}")]
    Spreadsheet { path: PathBuf, details: String },

    #[error("'{path}' has no header row")]
    MissingHeader { path: PathBuf },

    #[error("Column {position} in '{path}' has an empty name")]
    EmptyColumnName { path: PathBuf, position: usize },

    #[error("Column '{name}' appears more than once in '{path}'")]
    DuplicateColumn { path: PathBuf, name: String },

    #[error("Import task failed: {0}")]
    Task(String),
}

/// A parsed file, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedFile {
    pub metadata: DocumentMetadata,
    pub columns: Vec<Column>,
    pub documents: Vec<Document>,
}

impl ImportedFile {
    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_mime(&self.metadata.mime_type)
    }
}

/// Parse a spreadsheet or CSV file from disk
pub fn parse_file(path: impl AsRef<Path>) -> Result<ImportedFile, ImportError> {
    let path = path.as_ref();
    let kind = FileKind::from_path(path).ok_or_else(|| ImportError::UnsupportedFileType {
        path: path.to_path_buf(),
    })?;

    let size = std::fs::metadata(path)
        .map_err(|e| read_error(path, e))?
        .len();

    let (header, documents) = match kind {
        FileKind::Csv => delimited::read(path)?,
        FileKind::Spreadsheet => spreadsheet::read(path)?,
    };
    let columns = header_columns(path, header)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!(
        file = %name,
        %kind,
        columns = columns.len(),
        rows = documents.len(),
        "Parsed import file"
    );

    Ok(ImportedFile {
        metadata: DocumentMetadata {
            id: None,
            name,
            mime_type: kind.mime().to_string(),
            size,
        },
        columns,
        documents,
    })
}

/// Parse a file on the blocking pool
pub async fn parse_file_async(path: PathBuf) -> Result<ImportedFile, ImportError> {
    tokio::task::spawn_blocking(move || parse_file(&path))
        .await
        .map_err(|e| ImportError::Task(e.to_string()))?
}

fn header_columns(path: &Path, header: Vec<String>) -> Result<Vec<Column>, ImportError> {
    if header.is_empty() {
        return Err(ImportError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut columns: Vec<Column> = Vec::with_capacity(header.len());
    for (i, name) in header.into_iter().enumerate() {
        if name.trim().is_empty() {
            return Err(ImportError::EmptyColumnName {
                path: path.to_path_buf(),
                position: i + 1,
            });
        }
        if columns.iter().any(|c| c.name == name) {
            return Err(ImportError::DuplicateColumn {
                path: path.to_path_buf(),
                name,
            });
        }
        columns.push(Column::new(name));
    }
    Ok(columns)
}

fn read_error(path: &Path, source: std::io::Error) -> ImportError {
    if source.kind() == std::io::ErrorKind::NotFound {
        ImportError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        ImportError::FileRead {
            path: path.to_path_buf(),
            source,
        }
    }
}
