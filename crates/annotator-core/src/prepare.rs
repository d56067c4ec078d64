//! Classification preparation
//!
//! Holds a parsed file in memory while the user picks display columns and
//! defines labels. Nothing reaches the store until [`ImportPlan::commit`],
//! which replaces the previous session in one transaction.

use thiserror::Error;
use tracing::info;

use crate::display::DisplayMode;
use crate::import::ImportedFile;
use crate::models::{Column, Label, LabelMode};
use crate::storage::StorageError;
use crate::store::{ImportBatch, Store};

/// Most labels a session can define
pub const MAX_LABELS: usize = 5;

/// Fewest named labels needed to classify
pub const MIN_LABELS: usize = 2;

/// Errors raised while preparing an import
#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("Please upload an Excel/CSV file")]
    NoFile,

    #[error("Provide at least 2 labels")]
    TooFewLabels,

    #[error("Select the primary column to display")]
    NoPrimaryColumn,

    #[error("At most {max} labels can be defined")]
    TooManyLabels { max: usize },

    #[error("Label '{name}' is defined more than once")]
    DuplicateLabel { name: String },

    #[error("Label name cannot be empty")]
    EmptyLabelName,

    #[error("No label at position {index}")]
    LabelIndex { index: usize },

    #[error("Unknown column '{name}'")]
    UnknownColumn { name: String },

    #[error("Secondary columns are not available in {mode} display mode")]
    SecondaryUnavailable { mode: DisplayMode },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An import being configured, not yet persisted
#[derive(Debug, Clone)]
pub struct ImportPlan {
    mode: DisplayMode,
    file: Option<ImportedFile>,
    columns: Vec<Column>,
    labels: Vec<Label>,
}

impl ImportPlan {
    /// Start an empty plan with no file loaded
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            mode,
            file: None,
            columns: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Start a plan from a parsed file
    pub fn from_file(file: ImportedFile, mode: DisplayMode) -> Self {
        let mut plan = Self::new(mode);
        plan.load_file(file);
        plan
    }

    /// Load (or replace) the file; column choices start over
    pub fn load_file(&mut self, file: ImportedFile) {
        self.columns = file
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone()))
            .collect();
        self.file = Some(file);
    }

    pub fn file(&self) -> Option<&ImportedFile> {
        self.file.as_ref()
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The current primary column, if any
    pub fn primary(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary)
    }

    // ==================== Columns ====================

    /// Make `name` the primary column
    ///
    /// The previous primary is cleared. Selecting the current primary
    /// again leaves no primary column.
    pub fn select_primary(&mut self, name: &str) -> Result<(), PrepareError> {
        let index = self.column_index(name)?;
        let was_primary = self.columns[index].primary;

        for column in &mut self.columns {
            if column.primary {
                column.primary = false;
                column.secondary = false;
            }
        }

        let column = &mut self.columns[index];
        column.primary = !was_primary;
        column.secondary = false;
        Ok(())
    }

    /// Flip whether `name` is shown as a secondary column
    pub fn toggle_secondary(&mut self, name: &str) -> Result<(), PrepareError> {
        if !self.mode.allows_secondary() {
            return Err(PrepareError::SecondaryUnavailable { mode: self.mode });
        }

        let index = self.column_index(name)?;
        let column = &mut self.columns[index];
        column.primary = false;
        column.secondary = !column.secondary;
        Ok(())
    }

    fn column_index(&self, name: &str) -> Result<usize, PrepareError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| PrepareError::UnknownColumn {
                name: name.to_string(),
            })
    }

    // ==================== Labels ====================

    /// Append an empty label in editing mode, returning its position
    pub fn add_label(&mut self) -> Result<usize, PrepareError> {
        if self.labels.len() >= MAX_LABELS {
            return Err(PrepareError::TooManyLabels { max: MAX_LABELS });
        }
        self.labels.push(Label::editing());
        Ok(self.labels.len() - 1)
    }

    /// Append a label that is already named and saved
    pub fn add_named_label(&mut self, name: &str) -> Result<usize, PrepareError> {
        if name.trim().is_empty() {
            return Err(PrepareError::EmptyLabelName);
        }
        let index = self.add_label()?;
        self.set_label_name(index, name)?;
        self.save_label(index)?;
        Ok(index)
    }

    pub fn set_label_name(&mut self, index: usize, name: &str) -> Result<(), PrepareError> {
        self.label_mut(index)?.name = name.to_string();
        Ok(())
    }

    /// Confirm a label; an empty name leaves it in editing mode
    pub fn save_label(&mut self, index: usize) -> Result<(), PrepareError> {
        let label = self.label_mut(index)?;
        if label.is_named() {
            label.mode = LabelMode::Saved;
        }
        Ok(())
    }

    /// Reopen a saved label for editing
    pub fn edit_label(&mut self, index: usize) -> Result<(), PrepareError> {
        self.label_mut(index)?.mode = LabelMode::Editing;
        Ok(())
    }

    pub fn remove_label(&mut self, index: usize) -> Result<Label, PrepareError> {
        if index >= self.labels.len() {
            return Err(PrepareError::LabelIndex { index });
        }
        Ok(self.labels.remove(index))
    }

    fn label_mut(&mut self, index: usize) -> Result<&mut Label, PrepareError> {
        self.labels
            .get_mut(index)
            .ok_or(PrepareError::LabelIndex { index })
    }

    /// Labels that will be persisted: named, trimmed and saved
    fn named_labels(&self) -> Vec<Label> {
        self.labels
            .iter()
            .filter(|l| l.is_named())
            .map(|l| Label::saved(l.name.trim()))
            .collect()
    }

    // ==================== Commit ====================

    /// Check the plan can be committed
    pub fn validate(&self) -> Result<(), PrepareError> {
        if self.file.is_none() {
            return Err(PrepareError::NoFile);
        }

        let labels = self.named_labels();
        if labels.len() < MIN_LABELS {
            return Err(PrepareError::TooFewLabels);
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].iter().any(|l| l.name == label.name) {
                return Err(PrepareError::DuplicateLabel {
                    name: label.name.clone(),
                });
            }
        }

        if self.primary().is_none() {
            return Err(PrepareError::NoPrimaryColumn);
        }
        Ok(())
    }

    /// Validate, then replace the stored session with this plan
    pub fn commit(self, store: &mut Store) -> Result<(), PrepareError> {
        self.validate()?;

        let labels = self.named_labels();
        let file = self.file.ok_or(PrepareError::NoFile)?;
        let batch = ImportBatch {
            documents: file.documents,
            columns: self.columns,
            labels,
            metadata: Some(file.metadata),
        };
        store.replace_session(&batch)?;

        info!(
            documents = batch.documents.len(),
            labels = batch.labels.len(),
            "Committed import"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::CSV_MIME;
    use crate::models::{Document, DocumentMetadata};

    fn imported() -> ImportedFile {
        ImportedFile {
            metadata: DocumentMetadata {
                id: None,
                name: "people.csv".to_string(),
                mime_type: CSV_MIME.to_string(),
                size: 21,
            },
            columns: vec![Column::new("name"), Column::new("age"), Column::new("city")],
            documents: vec![
                Document::from_fields([("name", "A"), ("age", "1")]),
                Document::from_fields([("name", "B"), ("age", "2")]),
            ],
        }
    }

    fn ready_plan() -> ImportPlan {
        let mut plan = ImportPlan::from_file(imported(), DisplayMode::Multi);
        plan.select_primary("name").unwrap();
        plan.add_named_label("Yes").unwrap();
        plan.add_named_label("No").unwrap();
        plan
    }

    #[test]
    fn test_select_primary_replaces_previous() {
        let mut plan = ImportPlan::from_file(imported(), DisplayMode::Multi);
        plan.select_primary("name").unwrap();
        plan.select_primary("age").unwrap();

        assert_eq!(plan.primary().unwrap().name, "age");
        assert_eq!(plan.columns().iter().filter(|c| c.primary).count(), 1);
    }

    #[test]
    fn test_select_primary_twice_clears_it() {
        let mut plan = ImportPlan::from_file(imported(), DisplayMode::Multi);
        plan.select_primary("name").unwrap();
        plan.select_primary("name").unwrap();
        assert!(plan.primary().is_none());
    }

    #[test]
    fn test_primary_and_secondary_are_exclusive() {
        let mut plan = ImportPlan::from_file(imported(), DisplayMode::Multi);

        plan.toggle_secondary("age").unwrap();
        plan.select_primary("age").unwrap();
        let age = &plan.columns()[1];
        assert!(age.primary && !age.secondary);

        plan.toggle_secondary("age").unwrap();
        let age = &plan.columns()[1];
        assert!(!age.primary && age.secondary);

        plan.toggle_secondary("age").unwrap();
        assert!(!plan.columns()[1].secondary);
    }

    #[test]
    fn test_secondary_unavailable_in_single_mode() {
        let mut plan = ImportPlan::from_file(imported(), DisplayMode::Single);
        assert!(matches!(
            plan.toggle_secondary("age"),
            Err(PrepareError::SecondaryUnavailable { .. })
        ));
    }

    #[test]
    fn test_unknown_column() {
        let mut plan = ImportPlan::from_file(imported(), DisplayMode::Multi);
        assert!(matches!(
            plan.select_primary("nope"),
            Err(PrepareError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_label_editor() {
        let mut plan = ImportPlan::new(DisplayMode::Multi);

        let i = plan.add_label().unwrap();
        plan.save_label(i).unwrap();
        assert_eq!(plan.labels()[i].mode, LabelMode::Editing);

        plan.set_label_name(i, "Spam").unwrap();
        plan.save_label(i).unwrap();
        assert_eq!(plan.labels()[i].mode, LabelMode::Saved);

        plan.edit_label(i).unwrap();
        assert_eq!(plan.labels()[i].mode, LabelMode::Editing);

        let removed = plan.remove_label(i).unwrap();
        assert_eq!(removed.name, "Spam");
        assert!(plan.labels().is_empty());
        assert!(matches!(
            plan.remove_label(0),
            Err(PrepareError::LabelIndex { index: 0 })
        ));
    }

    #[test]
    fn test_at_most_five_labels() {
        let mut plan = ImportPlan::new(DisplayMode::Multi);
        for _ in 0..MAX_LABELS {
            plan.add_label().unwrap();
        }
        assert!(matches!(
            plan.add_label(),
            Err(PrepareError::TooManyLabels { max: 5 })
        ));
    }

    #[test]
    fn test_validate_messages() {
        let plan = ImportPlan::new(DisplayMode::Multi);
        assert_eq!(
            plan.validate().unwrap_err().to_string(),
            "Please upload an Excel/CSV file"
        );

        let mut plan = ImportPlan::from_file(imported(), DisplayMode::Multi);
        plan.add_named_label("Yes").unwrap();
        plan.add_label().unwrap();
        assert_eq!(
            plan.validate().unwrap_err().to_string(),
            "Provide at least 2 labels"
        );

        plan.add_named_label("No").unwrap();
        assert_eq!(
            plan.validate().unwrap_err().to_string(),
            "Select the primary column to display"
        );

        plan.select_primary("name").unwrap();
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let mut plan = ready_plan();
        plan.add_named_label(" Yes ").unwrap();
        assert!(matches!(
            plan.validate(),
            Err(PrepareError::DuplicateLabel { name }) if name == "Yes"
        ));
    }

    #[test]
    fn test_commit_replaces_session() {
        let mut store = Store::open_in_memory().unwrap();
        store.bulk_add(&[Label::saved("Old")]).unwrap();

        let mut plan = ready_plan();
        plan.add_label().unwrap();
        plan.commit(&mut store).unwrap();

        assert_eq!(store.count::<Document>().unwrap(), 2);
        let labels = store.get_all::<Label>().unwrap();
        let names: Vec<_> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Yes", "No"]);
        assert!(labels.iter().all(|l| l.mode == LabelMode::Saved));

        let columns = store.get_all::<Column>().unwrap();
        assert_eq!(columns.len(), 3);
        assert!(columns[0].primary);
        assert_eq!(store.metadata().unwrap().unwrap().name, "people.csv");
    }

    #[test]
    fn test_invalid_commit_leaves_store_untouched() {
        let mut store = Store::open_in_memory().unwrap();
        store.bulk_add(&[Label::saved("Old")]).unwrap();

        let plan = ImportPlan::from_file(imported(), DisplayMode::Multi);
        assert!(plan.commit(&mut store).is_err());
        assert_eq!(store.get_all::<Label>().unwrap()[0].name, "Old");
    }
}
