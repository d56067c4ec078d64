//! Data models for the annotator
//!
//! Defines the records held by the local store: imported documents,
//! column metadata, classification labels, and the metadata of the
//! originally imported file.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::storage::{Collection, Record, RecordId};

/// A single cell of an imported row
///
/// Serialized untagged, so stored documents read like the original row.
/// Dates are wrapped as `{"date": ...}`; a bare JSON string is always text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    #[serde(with = "date_cell")]
    Date(NaiveDateTime),
    Text(String),
}

mod date_cell {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Wrapped {
        date: NaiveDateTime,
    }

    pub fn serialize<S: Serializer>(
        date: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        Wrapped { date: *date }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        Wrapped::deserialize(deserializer).map(|wrapped| wrapped.date)
    }
}

impl CellValue {
    /// Whether the cell carries no visible content
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// One imported data row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Document {
    /// Store-assigned identifier (None until inserted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Cell values keyed by column name
    pub fields: BTreeMap<String, CellValue>,
    /// Assigned label name; absent until classified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Document {
    /// Create an unlabelled document from column/value pairs
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        Self {
            id: None,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            label: None,
        }
    }

    /// Get the value for a column
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column)
    }

    /// Whether the document has been classified
    pub fn is_labelled(&self) -> bool {
        self.label.is_some()
    }

    /// Copy of this document carrying a new label
    pub fn with_label(&self, label: Option<String>) -> Self {
        Self {
            label,
            ..self.clone()
        }
    }
}

/// One column of the imported schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Column name (identity)
    pub name: String,
    /// Main display column of a card; `selected` in single-select layouts
    #[serde(default, alias = "selected")]
    pub primary: bool,
    /// Shown in the expandable part of a card
    #[serde(default)]
    pub secondary: bool,
}

impl Column {
    /// Create an unselected column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            primary: false,
            secondary: false,
        }
    }
}

/// Whether a label is still being typed or has been confirmed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    #[default]
    Editing,
    Saved,
}

/// A user-defined classification category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub mode: LabelMode,
}

impl Label {
    /// Create an empty label in editing mode
    pub fn editing() -> Self {
        Self {
            id: None,
            name: String::new(),
            mode: LabelMode::Editing,
        }
    }

    /// Create a confirmed label
    pub fn saved(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            mode: LabelMode::Saved,
        }
    }

    /// Whether the label has a usable name
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Details of the originally imported file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// File name as imported
    pub name: String,
    /// MIME type, used to pick the export format
    #[serde(rename = "type")]
    pub mime_type: String,
    /// File size in bytes
    pub size: u64,
}

/// A bounded slice of a collection plus the collection's total size
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<R> {
    pub records: Vec<R>,
    pub total_count: usize,
}

impl Record for Document {
    const COLLECTION: Collection = Collection::Documents;

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}

impl Record for Column {
    const COLLECTION: Collection = Collection::Columns;

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}

impl Record for Label {
    const COLLECTION: Collection = Collection::Labels;

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}

impl Record for DocumentMetadata {
    const COLLECTION: Collection = Collection::DocumentMetadata;

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::from("abc").to_string(), "abc");
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Bool(true).to_string(), "true");

        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "2024-03-01 09:30:00");
    }

    #[test]
    fn test_cell_value_keeps_kind_through_json() {
        let doc = Document::from_fields([
            ("name", CellValue::from("A")),
            ("age", CellValue::Number(31.0)),
            ("active", CellValue::Bool(false)),
        ]);

        let json = serde_json::to_string(&doc).unwrap();
        let parsed: Document = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, doc);
        assert_eq!(parsed.get("age"), Some(&CellValue::Number(31.0)));
        assert_eq!(parsed.get("active"), Some(&CellValue::Bool(false)));
    }

    #[test]
    fn test_numeric_text_stays_text() {
        // CSV cells are text even when they look like numbers
        let json = r#"{"fields":{"age":"1"}}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.get("age"), Some(&CellValue::Text("1".to_string())));
    }

    #[test]
    fn test_date_shaped_text_stays_text() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let doc = Document::from_fields([
            ("when", CellValue::from("2024-03-01T09:30:00")),
            ("seen", CellValue::Date(date)),
        ]);

        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains(r#""when":"2024-03-01T09:30:00""#));
        assert!(json.contains(r#""seen":{"date":"2024-03-01T09:30:00"}"#));

        let parsed: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
        assert_eq!(
            parsed.get("when"),
            Some(&CellValue::Text("2024-03-01T09:30:00".to_string()))
        );
    }

    #[test]
    fn test_with_label_preserves_fields() {
        let doc = Document::from_fields([("name", "A"), ("age", "1")]);
        let labelled = doc.with_label(Some("Yes".to_string()));

        assert_eq!(labelled.fields, doc.fields);
        assert_eq!(labelled.label.as_deref(), Some("Yes"));
        assert!(!doc.is_labelled());
        assert!(labelled.is_labelled());
    }

    #[test]
    fn test_column_accepts_selected_alias() {
        let column: Column = serde_json::from_str(r#"{"name":"title","selected":true}"#).unwrap();
        assert!(column.primary);
        assert!(!column.secondary);
    }

    #[test]
    fn test_label_mode_serialization() {
        let label = Label::saved("Yes");
        let json = serde_json::to_string(&label).unwrap();
        assert!(json.contains(r#""mode":"saved""#));

        assert!(!Label::editing().is_named());
        assert!(Label::saved("No").is_named());
    }

    #[test]
    fn test_metadata_uses_type_key() {
        let meta = DocumentMetadata {
            id: None,
            name: "data.csv".to_string(),
            mime_type: "text/csv".to_string(),
            size: 42,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "text/csv");
    }
}
