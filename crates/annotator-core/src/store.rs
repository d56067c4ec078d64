//! Unified storage interface
//!
//! The `Store` owns the SQLite connection and exposes the same small set
//! of operations for each of the four collections:
//! - documents (imported rows)
//! - columns (display configuration)
//! - labels (classification categories)
//! - document metadata (the imported file)
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open_with_config(&config)?;
//!
//! store.bulk_add(&documents)?;
//! let page = store.get_page::<Document>(1, 50)?;
//! ```

use std::path::PathBuf;

use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{Column, Document, DocumentMetadata, Label, Page};
use crate::storage::{
    migrate, tables, Collection, Record, RecordId, StorageError, StorageResult, StorageStats,
};

/// Everything written by one import, replacing the previous session
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub documents: Vec<Document>,
    pub columns: Vec<Column>,
    pub labels: Vec<Label>,
    pub metadata: Option<DocumentMetadata>,
}

/// Local document store
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open the store at the configured location, creating it if absent
    ///
    /// An existing database at an older schema version is upgraded in
    /// place; existing rows are preserved.
    pub fn open_with_config(config: &Config) -> StorageResult<Self> {
        let path = config.database_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| {
                match StorageError::from_io(source, parent.to_path_buf()) {
                    StorageError::FileIo { path, source } => {
                        StorageError::CreateDirectory { path, source }
                    }
                    classified => classified,
                }
            })?;
        }

        let conn = Connection::open(&path)?;
        Self::init(conn, Some(path))
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        let created = migrate(&conn)?;
        if !created.is_empty() {
            info!(?created, "Created missing collections");
        }
        debug!(path = ?path, "Database connection established");
        Ok(Self { conn, path })
    }

    // ==================== Collection Operations ====================

    /// Insert records as new entries
    ///
    /// All records are committed together or not at all.
    pub fn bulk_add<R: Record>(&mut self, records: &[R]) -> StorageResult<Vec<RecordId>> {
        let tx = self.conn.transaction()?;
        let ids = tables::insert_records(&tx, records)?;
        tx.commit()?;

        info!(collection = %R::COLLECTION, count = ids.len(), "Added records");
        Ok(ids)
    }

    /// Every record of a collection, in key order
    pub fn get_all<R: Record>(&self) -> StorageResult<Vec<R>> {
        let records = tables::select_all(&self.conn)?;
        debug!(collection = %R::COLLECTION, count = records.len(), "Read all records");
        Ok(records)
    }

    /// A single record by identifier
    pub fn get<R: Record>(&self, id: RecordId) -> StorageResult<Option<R>> {
        tables::select_one(&self.conn, id)
    }

    /// One page of a collection plus the collection's total size
    ///
    /// `page_number` is 1-based. Pages past the end are empty but still
    /// report the true total.
    pub fn get_page<R: Record>(
        &self,
        page_number: usize,
        page_size: usize,
    ) -> StorageResult<Page<R>> {
        if page_number == 0 || page_size == 0 {
            return Err(StorageError::InvalidPage {
                page_number,
                page_size,
            });
        }

        // Read the page and the count from one snapshot
        let tx = self.conn.unchecked_transaction()?;
        let total_count = tables::count(&tx, R::COLLECTION)?;
        let records = match (page_number - 1).checked_mul(page_size) {
            Some(offset) if offset < total_count => tables::select_range(&tx, page_size, offset)?,
            _ => Vec::new(),
        };
        tx.commit()?;

        debug!(
            collection = %R::COLLECTION,
            page_number,
            page_size,
            returned = records.len(),
            total_count,
            "Read page"
        );
        Ok(Page {
            records,
            total_count,
        })
    }

    /// Insert or update a single record
    ///
    /// A record without an identifier is inserted. A record with an
    /// identifier replaces the stored one; `NotFound` if it does not exist.
    pub fn put<R: Record>(&mut self, record: &R) -> StorageResult<RecordId> {
        match record.id() {
            Some(id) => {
                tables::update_record(&self.conn, id, record)?;
                debug!(collection = %R::COLLECTION, %id, "Updated record");
                Ok(id)
            }
            None => {
                let id = tables::insert_record(&self.conn, record)?;
                debug!(collection = %R::COLLECTION, %id, "Inserted record");
                Ok(id)
            }
        }
    }

    /// Number of records in a collection
    pub fn count<R: Record>(&self) -> StorageResult<usize> {
        tables::count(&self.conn, R::COLLECTION)
    }

    /// Delete every record in one collection
    pub fn clear<R: Record>(&mut self) -> StorageResult<usize> {
        let removed = tables::clear(&self.conn, R::COLLECTION)?;
        info!(collection = %R::COLLECTION, removed, "Cleared collection");
        Ok(removed)
    }

    /// Delete every record in all four collections
    pub fn clear_all(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        for collection in Collection::ALL {
            tables::clear(&tx, collection)?;
        }
        tx.commit()?;

        info!("Cleared all collections");
        Ok(())
    }

    /// Replace the whole session with a freshly imported one
    ///
    /// Clears all four collections and writes the batch in one
    /// transaction, so a failure leaves the previous session intact.
    pub fn replace_session(&mut self, batch: &ImportBatch) -> StorageResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        for collection in Collection::ALL {
            tables::clear(&tx, collection)?;
        }
        tables::insert_records(&tx, &batch.documents)?;
        tables::insert_records(&tx, &batch.columns)?;
        tables::insert_records(&tx, &batch.labels)?;
        if let Some(metadata) = &batch.metadata {
            tables::insert_record(&tx, metadata)?;
        }

        tx.commit()?;

        info!(
            documents = batch.documents.len(),
            columns = batch.columns.len(),
            labels = batch.labels.len(),
            "Replaced session"
        );
        Ok(())
    }

    // ==================== Convenience ====================

    /// Whether a previous session holds data worth keeping
    ///
    /// True only when documents, labels and columns are all present.
    pub fn has_session(&self) -> StorageResult<bool> {
        Ok(self.count::<Document>()? > 0
            && self.count::<Label>()? > 0
            && self.count::<Column>()? > 0)
    }

    /// Metadata of the imported file, if any
    pub fn metadata(&self) -> StorageResult<Option<DocumentMetadata>> {
        Ok(self.get_all::<DocumentMetadata>()?.into_iter().next())
    }

    // ==================== Stats ====================

    /// Get storage statistics
    pub fn stats(&self) -> StorageStats {
        let database_size = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        StorageStats {
            database_path: self.path.clone(),
            database_exists: self.path.as_ref().is_some_and(|p| p.exists()),
            database_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use crate::models::CellValue;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn numbered_documents(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document::from_fields([("n", CellValue::Number(i as f64))]))
            .collect()
    }

    fn document_numbers(docs: &[Document]) -> Vec<usize> {
        docs.iter()
            .map(|d| match d.get("n") {
                Some(CellValue::Number(n)) => *n as usize,
                other => panic!("unexpected cell {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_open_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir.path().join("nested"));

        let store = Store::open_with_config(&config).unwrap();

        assert!(config.database_path().exists());
        let stats = store.stats();
        assert!(stats.database_exists);
        assert_eq!(stats.database_path, Some(config.database_path()));
    }

    #[test]
    fn test_get_all_on_empty_collection() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_all::<Document>().unwrap().is_empty());
        assert!(store.get_all::<Label>().unwrap().is_empty());
        assert!(store.metadata().unwrap().is_none());
    }

    #[test]
    fn test_bulk_add_then_get_all() {
        let mut store = Store::open_in_memory().unwrap();

        let ids = store.bulk_add(&numbered_documents(7)).unwrap();
        assert_eq!(ids.len(), 7);

        let docs = store.get_all::<Document>().unwrap();
        assert_eq!(docs.len(), 7);
        assert!(docs.iter().all(|d| d.id.is_some()));
        assert_eq!(store.count::<Document>().unwrap(), 7);
    }

    #[test]
    fn test_page_past_end_is_empty_with_total() {
        let mut store = Store::open_in_memory().unwrap();
        store.bulk_add(&numbered_documents(5)).unwrap();

        let page = store.get_page::<Document>(2, 5).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total_count, 5);

        let page = store.get_page::<Document>(usize::MAX, usize::MAX).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total_count, 5);
    }

    #[test]
    fn test_page_zero_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.get_page::<Document>(0, 10),
            Err(StorageError::InvalidPage { .. })
        ));
        assert!(matches!(
            store.get_page::<Document>(1, 0),
            Err(StorageError::InvalidPage { .. })
        ));
    }

    #[test]
    fn test_put_updates_label_and_keeps_fields() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .bulk_add(&[
                Document::from_fields([("name", "A"), ("age", "1")]),
                Document::from_fields([("name", "B"), ("age", "2")]),
            ])
            .unwrap();

        let first = store.get_page::<Document>(1, 1).unwrap().records.remove(0);
        let labelled = first.with_label(Some("Yes".to_string()));
        store.put(&labelled).unwrap();

        let docs = store.get_all::<Document>().unwrap();
        assert_eq!(docs[0].label.as_deref(), Some("Yes"));
        assert_eq!(docs[0].fields, first.fields);
        assert!(docs[1].label.is_none());

        let page = store.get_page::<Document>(1, 10).unwrap();
        assert_eq!(page.records[0].label.as_deref(), Some("Yes"));
    }

    #[test]
    fn test_put_unknown_id_is_not_found() {
        let mut store = Store::open_in_memory().unwrap();
        let mut doc = Document::from_fields([("name", "ghost")]);
        doc.id = Some(RecordId::new(404));

        let err = store.put(&doc).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
        assert_eq!(store.count::<Document>().unwrap(), 0);
    }

    #[test]
    fn test_put_without_id_inserts() {
        let mut store = Store::open_in_memory().unwrap();
        let meta = DocumentMetadata {
            id: None,
            name: "data.csv".to_string(),
            mime_type: "text/csv".to_string(),
            size: 12,
        };

        let id = store.put(&meta).unwrap();
        let stored = store.metadata().unwrap().unwrap();
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.name, "data.csv");
    }

    #[test]
    fn test_clear_one_collection() {
        let mut store = Store::open_in_memory().unwrap();
        store.bulk_add(&numbered_documents(3)).unwrap();
        store.bulk_add(&[Label::saved("Yes")]).unwrap();

        assert_eq!(store.clear::<Document>().unwrap(), 3);
        assert_eq!(store.count::<Document>().unwrap(), 0);
        assert_eq!(store.count::<Label>().unwrap(), 1);
    }

    #[test]
    fn test_clear_all_empties_every_collection() {
        let mut store = Store::open_in_memory().unwrap();
        store.bulk_add(&numbered_documents(3)).unwrap();
        store.bulk_add(&[Column::new("n")]).unwrap();
        store.bulk_add(&[Label::saved("Yes")]).unwrap();
        store
            .put(&DocumentMetadata {
                id: None,
                name: "f.csv".to_string(),
                mime_type: "text/csv".to_string(),
                size: 1,
            })
            .unwrap();

        store.clear_all().unwrap();

        assert!(store.get_all::<Document>().unwrap().is_empty());
        assert!(store.get_all::<Column>().unwrap().is_empty());
        assert!(store.get_all::<Label>().unwrap().is_empty());
        assert!(store.get_all::<DocumentMetadata>().unwrap().is_empty());
    }

    #[test]
    fn test_replace_session_wipes_previous_import() {
        let mut store = Store::open_in_memory().unwrap();
        store.bulk_add(&numbered_documents(10)).unwrap();
        store.bulk_add(&[Label::saved("Old")]).unwrap();

        let batch = ImportBatch {
            documents: numbered_documents(2),
            columns: vec![Column::new("n")],
            labels: vec![Label::saved("Yes"), Label::saved("No")],
            metadata: Some(DocumentMetadata {
                id: None,
                name: "new.csv".to_string(),
                mime_type: "text/csv".to_string(),
                size: 10,
            }),
        };
        store.replace_session(&batch).unwrap();

        assert_eq!(store.count::<Document>().unwrap(), 2);
        let labels: Vec<String> = store
            .get_all::<Label>()
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(labels, vec!["Yes", "No"]);
        assert!(store.has_session().unwrap());
        assert_eq!(store.metadata().unwrap().unwrap().name, "new.csv");
    }

    #[test]
    fn test_has_session_requires_all_parts() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(!store.has_session().unwrap());

        store.bulk_add(&numbered_documents(1)).unwrap();
        store.bulk_add(&[Label::saved("Yes")]).unwrap();
        assert!(!store.has_session().unwrap());

        store.bulk_add(&[Column::new("n")]).unwrap();
        assert!(store.has_session().unwrap());
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());

        {
            let mut store = Store::open_with_config(&config).unwrap();
            store.bulk_add(&numbered_documents(4)).unwrap();
            store.bulk_add(&[Label::saved("Yes")]).unwrap();
        }

        let store = Store::open_with_config(&config).unwrap();
        assert_eq!(store.count::<Document>().unwrap(), 4);
        assert_eq!(store.get_all::<Label>().unwrap()[0].name, "Yes");
    }

    proptest! {
        #[test]
        fn prop_pages_partition_collection(n in 0usize..120, page_size in 1usize..25) {
            let mut store = Store::open_in_memory().unwrap();
            store.bulk_add(&numbered_documents(n)).unwrap();

            let page_count = n.div_ceil(page_size);
            let mut seen = Vec::new();
            for page_number in 1..=page_count {
                let page = store.get_page::<Document>(page_number, page_size).unwrap();
                prop_assert_eq!(page.total_count, n);

                let expected = if page_number < page_count {
                    page_size
                } else if n % page_size == 0 {
                    page_size
                } else {
                    n % page_size
                };
                prop_assert_eq!(page.records.len(), expected);
                seen.extend(document_numbers(&page.records));
            }

            prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());

            let beyond = store.get_page::<Document>(page_count + 1, page_size).unwrap();
            prop_assert!(beyond.records.is_empty());
            prop_assert_eq!(beyond.total_count, n);
        }
    }
}
