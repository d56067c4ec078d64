//! Row-level operations on collection tables
//!
//! These helpers take a plain connection so they can run either directly
//! or inside a transaction opened by the store.

use rusqlite::{params, Connection, OptionalExtension};

use super::collection::{Collection, Record, RecordId};
use super::error::{StorageError, StorageResult};

/// Encode a record as a JSON body, leaving the identifier to the row key
fn encode<R: Record>(record: &R) -> StorageResult<String> {
    let mut value = serde_json::to_value(record).map_err(|source| StorageError::Serialization {
        collection: R::COLLECTION,
        source,
    })?;
    if let Some(object) = value.as_object_mut() {
        object.remove("id");
    }
    Ok(value.to_string())
}

/// Decode a JSON body and attach its row identifier
fn decode<R: Record>(id: i64, body: &str) -> StorageResult<R> {
    let mut record: R =
        serde_json::from_str(body).map_err(|source| StorageError::Serialization {
            collection: R::COLLECTION,
            source,
        })?;
    record.set_id(RecordId::new(id));
    Ok(record)
}

fn collect_rows<R: Record>(rows: Vec<(i64, String)>) -> StorageResult<Vec<R>> {
    rows.iter().map(|(id, body)| decode(*id, body)).collect()
}

/// Insert one record, returning its new identifier
pub fn insert_record<R: Record>(conn: &Connection, record: &R) -> StorageResult<RecordId> {
    let body = encode(record)?;
    conn.prepare_cached(&format!(
        "INSERT INTO {} (body) VALUES (?1)",
        R::COLLECTION.table_name()
    ))?
    .execute(params![body])?;
    Ok(RecordId::new(conn.last_insert_rowid()))
}

/// Insert records in order, returning their new identifiers
pub fn insert_records<R: Record>(conn: &Connection, records: &[R]) -> StorageResult<Vec<RecordId>> {
    records
        .iter()
        .map(|record| insert_record(conn, record))
        .collect()
}

/// Replace the body of an existing record
pub fn update_record<R: Record>(conn: &Connection, id: RecordId, record: &R) -> StorageResult<()> {
    let body = encode(record)?;
    let changed = conn
        .prepare_cached(&format!(
            "UPDATE {} SET body = ?1 WHERE id = ?2",
            R::COLLECTION.table_name()
        ))?
        .execute(params![body, id.get()])?;

    if changed == 0 {
        return Err(StorageError::NotFound {
            collection: R::COLLECTION,
            id,
        });
    }
    Ok(())
}

/// Every record in key order
pub fn select_all<R: Record>(conn: &Connection) -> StorageResult<Vec<R>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT id, body FROM {} ORDER BY id",
        R::COLLECTION.table_name()
    ))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<(i64, String)>, _>>()?;
    collect_rows(rows)
}

/// At most `limit` records in key order, skipping the first `offset`
pub fn select_range<R: Record>(
    conn: &Connection,
    limit: usize,
    offset: usize,
) -> StorageResult<Vec<R>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let offset = match i64::try_from(offset) {
        Ok(offset) => offset,
        Err(_) => return Ok(Vec::new()),
    };

    let mut stmt = conn.prepare_cached(&format!(
        "SELECT id, body FROM {} ORDER BY id LIMIT ?1 OFFSET ?2",
        R::COLLECTION.table_name()
    ))?;
    let rows = stmt
        .query_map(params![limit, offset], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<(i64, String)>, _>>()?;
    collect_rows(rows)
}

/// A single record by identifier
pub fn select_one<R: Record>(conn: &Connection, id: RecordId) -> StorageResult<Option<R>> {
    let row: Option<(i64, String)> = conn
        .prepare_cached(&format!(
            "SELECT id, body FROM {} WHERE id = ?1",
            R::COLLECTION.table_name()
        ))?
        .query_row(params![id.get()], |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()?;

    row.map(|(id, body)| decode(id, &body)).transpose()
}

/// Number of records in a collection
pub fn count(conn: &Connection, collection: Collection) -> StorageResult<usize> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", collection.table_name()),
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Delete every record in a collection, returning how many were removed
pub fn clear(conn: &Connection, collection: Collection) -> StorageResult<usize> {
    let removed = conn.execute(&format!("DELETE FROM {}", collection.table_name()), [])?;
    Ok(removed)
}
