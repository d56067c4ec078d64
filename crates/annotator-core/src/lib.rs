//! Data Annotator Core Library
//!
//! This crate provides the core functionality for the data annotator,
//! a local tool for importing tabular files, classifying each row with
//! user-defined labels, and exporting the labelled result.
//!
//! # Architecture
//!
//! - **SQLite**: One local database holds four record collections
//!   (documents, columns, labels, document metadata)
//!
//! Every flow reads and writes through the [`Store`]; nothing is cached
//! between commands.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = Store::open_with_config(&config)?;
//!
//! // Import a file and prepare it for classification
//! let mut plan = ImportPlan::from_file(parse_file("survey.csv")?, DisplayMode::Multi);
//! plan.select_primary("comment")?;
//! plan.add_named_label("Positive")?;
//! plan.add_named_label("Negative")?;
//! plan.commit(&mut store)?;
//!
//! // Classify
//! let view = ClassificationView::load(&store, config.page_size, config.display_mode)?;
//! let page = view.page(&store, 1)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `handle`: Async, cloneable handle over the store
//! - `models`: Records for documents, columns, labels and file metadata
//! - `storage`: SQLite schema, collections and typed errors
//! - `import`: CSV / spreadsheet parsing
//! - `prepare`: Column and label configuration before classification
//! - `display`: Card layout for single- and multi-column display
//! - `classify`: Paginated classification view
//! - `export`: Labelled data export
//! - `config`: Application configuration

pub mod classify;
pub mod config;
pub mod display;
pub mod export;
pub mod handle;
pub mod import;
pub mod models;
pub mod prepare;
pub mod storage;
pub mod store;

pub use classify::{CardPage, ClassificationView, ClassifyError, LabelCount, LabelSummary};
pub use config::Config;
pub use display::{Card, CardField, DisplayConfig, DisplayMode, ParseDisplayModeError};
pub use export::{export_labelled, ExportError, ExportFormat, ExportSummary};
pub use handle::StoreHandle;
pub use import::{parse_file, parse_file_async, FileKind, ImportError, ImportedFile};
pub use models::{CellValue, Column, Document, DocumentMetadata, Label, LabelMode, Page};
pub use prepare::{ImportPlan, PrepareError};
pub use storage::{Collection, Record, RecordId, StorageError, StorageResult, StorageStats};
pub use store::{ImportBatch, Store};
