//! Async store handle
//!
//! `StoreHandle` is the explicitly constructed, shareable entry point for
//! async callers. SQLite work runs on tokio's blocking pool so the runtime
//! is never blocked; concurrent calls are serialized on one connection.

use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::models::Page;
use crate::storage::{Record, RecordId, StorageError, StorageResult};
use crate::store::Store;

/// Cloneable async handle over a [`Store`]
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<Mutex<Store>>,
}

impl StoreHandle {
    /// Open the store on a blocking thread and wrap it in a handle
    pub async fn open(config: Config) -> StorageResult<Self> {
        let store = tokio::task::spawn_blocking(move || Store::open_with_config(&config))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))??;
        Ok(Self::new(store))
    }

    /// Wrap an already opened store
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a closure against the store on the blocking pool
    ///
    /// This is how multi-step flows (import, classification, export) run
    /// without holding the runtime.
    pub async fn call<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Store) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StorageError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut store = inner
                .lock()
                .map_err(|_| StorageError::Task("store lock poisoned".to_string()))?;
            f(&mut *store)
        })
        .await
        .map_err(|e| E::from(StorageError::Task(e.to_string())))?
    }

    pub async fn bulk_add<R: Record>(&self, records: Vec<R>) -> StorageResult<Vec<RecordId>> {
        self.call(move |store| store.bulk_add(&records)).await
    }

    pub async fn get_all<R: Record>(&self) -> StorageResult<Vec<R>> {
        self.call(|store| store.get_all::<R>()).await
    }

    pub async fn get_page<R: Record>(
        &self,
        page_number: usize,
        page_size: usize,
    ) -> StorageResult<Page<R>> {
        self.call(move |store| store.get_page::<R>(page_number, page_size))
            .await
    }

    pub async fn put<R: Record>(&self, record: R) -> StorageResult<RecordId> {
        self.call(move |store| store.put(&record)).await
    }

    pub async fn clear<R: Record>(&self) -> StorageResult<usize> {
        self.call(|store| store.clear::<R>()).await
    }

    pub async fn clear_all(&self) -> StorageResult<()> {
        self.call(|store| store.clear_all()).await
    }
}
