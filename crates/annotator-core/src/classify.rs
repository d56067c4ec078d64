//! Classification view
//!
//! Pages through stored documents as cards and writes label assignments
//! back one document at a time.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::display::{Card, DisplayConfig, DisplayMode};
use crate::models::{Column, Document, Label};
use crate::storage::{RecordId, StorageError};
use crate::store::Store;

/// Errors raised while classifying
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("No data imported yet. Run 'annotator import <file>' first.")]
    NoSession,

    #[error("Select the primary column to display")]
    NoPrimaryColumn,

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("Unknown label '{label}'. Available labels: {available}")]
    UnknownLabel { label: String, available: String },

    #[error("No document with id {id}")]
    UnknownDocument { id: RecordId },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One page of cards
#[derive(Debug, Clone, Serialize)]
pub struct CardPage {
    /// 1-based page number
    pub page: usize,
    pub page_count: usize,
    pub total_count: usize,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Documents per label
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LabelSummary {
    pub counts: Vec<LabelCount>,
    pub unlabelled: usize,
    pub total: usize,
}

/// The stored session, ready to classify
#[derive(Debug, Clone)]
pub struct ClassificationView {
    page_size: usize,
    display: DisplayConfig,
    labels: Vec<Label>,
}

impl ClassificationView {
    /// Read the column layout and labels of the current session
    pub fn load(store: &Store, page_size: usize, mode: DisplayMode) -> Result<Self, ClassifyError> {
        if page_size == 0 {
            return Err(ClassifyError::InvalidPageSize);
        }

        let columns = store.get_all::<Column>()?;
        if columns.is_empty() {
            return Err(ClassifyError::NoSession);
        }

        let display = DisplayConfig::from_columns(&columns, mode);
        if display.primary().is_none() {
            return Err(ClassifyError::NoPrimaryColumn);
        }

        let labels = store.get_all::<Label>()?;
        debug!(page_size, %mode, labels = labels.len(), "Loaded classification view");

        Ok(Self {
            page_size,
            display,
            labels,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Cards for one 1-based page
    pub fn page(&self, store: &Store, page_number: usize) -> Result<CardPage, ClassifyError> {
        let page = store.get_page::<Document>(page_number, self.page_size)?;
        let cards = page
            .records
            .iter()
            .filter_map(|doc| self.display.card(doc))
            .collect();

        Ok(CardPage {
            page: page_number,
            page_count: page.total_count.div_ceil(self.page_size),
            total_count: page.total_count,
            cards,
        })
    }

    /// A single card by document id
    pub fn card(&self, store: &Store, id: RecordId) -> Result<Card, ClassifyError> {
        let document = self.document(store, id)?;
        self.display
            .card(&document)
            .ok_or(ClassifyError::NoPrimaryColumn)
    }

    /// Assign one of the session's labels to a document
    pub fn assign(
        &self,
        store: &mut Store,
        id: RecordId,
        label: &str,
    ) -> Result<Document, ClassifyError> {
        let label = self
            .labels
            .iter()
            .find(|l| l.name == label)
            .ok_or_else(|| ClassifyError::UnknownLabel {
                label: label.to_string(),
                available: self.label_names().join(", "),
            })?;

        let document = self
            .document(store, id)?
            .with_label(Some(label.name.clone()));
        store.put(&document)?;

        info!(%id, label = %label.name, "Labelled document");
        Ok(document)
    }

    /// Remove a document's label
    pub fn unassign(&self, store: &mut Store, id: RecordId) -> Result<Document, ClassifyError> {
        let document = self.document(store, id)?.with_label(None);
        store.put(&document)?;

        info!(%id, "Cleared document label");
        Ok(document)
    }

    /// Count documents per label
    pub fn label_summary(&self, store: &Store) -> Result<LabelSummary, ClassifyError> {
        let documents = store.get_all::<Document>()?;

        let mut counts: Vec<LabelCount> = self
            .labels
            .iter()
            .map(|l| LabelCount {
                label: l.name.clone(),
                count: 0,
            })
            .collect();
        let mut unlabelled = 0;

        for document in &documents {
            match &document.label {
                None => unlabelled += 1,
                Some(name) => match counts.iter_mut().find(|c| &c.label == name) {
                    Some(entry) => entry.count += 1,
                    None => warn!(id = ?document.id, label = %name, "Document carries an unknown label"),
                },
            }
        }

        Ok(LabelSummary {
            counts,
            unlabelled,
            total: documents.len(),
        })
    }

    fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }

    fn document(&self, store: &Store, id: RecordId) -> Result<Document, ClassifyError> {
        store
            .get::<Document>(id)?
            .ok_or(ClassifyError::UnknownDocument { id })
    }
}
