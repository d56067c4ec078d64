//! SQLite schema for the local document store
//!
//! One table per collection. Each row is a JSON record body keyed by an
//! auto-incrementing integer that is never reused, even after a clear.
//!
//! Upgrading from an older version only ever adds missing tables; rows in
//! tables that already exist are left untouched.

use rusqlite::{Connection, OptionalExtension};

use super::collection::Collection;
use super::error::{StorageError, StorageResult};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 2;

/// Bring the database up to the current schema version
///
/// Creates any missing collection tables and records the version.
/// Returns the collections that had to be created.
pub fn migrate(conn: &Connection) -> StorageResult<Vec<Collection>> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;

    if let Some(found) = get_schema_version(conn)? {
        if found > SCHEMA_VERSION {
            return Err(StorageError::SchemaTooNew {
                found,
                supported: SCHEMA_VERSION,
            });
        }
    }

    let mut created = Vec::new();
    for collection in Collection::ALL {
        if !table_exists(conn, collection.table_name())? {
            conn.execute_batch(&format!(
                "CREATE TABLE {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    body TEXT NOT NULL
                );",
                collection.table_name()
            ))?;
            created.push(collection);
        }
    }

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(created)
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> StorageResult<Option<i32>> {
    if !table_exists(conn, "schema_info")? {
        return Ok(None);
    }

    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_info WHERE key = 'version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version.and_then(|v| v.parse().ok()))
}

fn table_exists(conn: &Connection, name: &str) -> StorageResult<bool> {
    let exists = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?")?
        .exists([name])?;
    Ok(exists)
}
