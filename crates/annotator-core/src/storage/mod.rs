//! Storage layer
//!
//! Handles the SQLite database behind the local document store.
//!
//! ## Architecture
//!
//! - **Collections**: four independent tables, one per record type
//! - **Records**: stored as JSON bodies keyed by an auto-assigned integer
//!
//! Every operation runs in its own transaction scoped to the tables it
//! touches.

pub mod collection;
pub mod error;
pub mod schema;
pub mod tables;

use std::path::PathBuf;

pub use collection::{Collection, Record, RecordId};
pub use error::{StorageError, StorageResult};
pub use schema::{migrate, SCHEMA_VERSION};

/// Storage statistics
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    /// Path of the database file (None for in-memory stores)
    pub database_path: Option<PathBuf>,
    /// Whether the database file exists
    pub database_exists: bool,
    /// Size of the database file in bytes
    pub database_size: u64,
}
