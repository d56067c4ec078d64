//! Document display configuration
//!
//! One card per document: the primary column's value, optionally followed
//! by the secondary columns. `DisplayMode` switches between the
//! single-column layout and the primary + secondary layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CellValue, Column, Document};
use crate::storage::RecordId;

/// Card layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Only the primary column is shown
    Single,
    /// Primary column plus any number of secondary columns
    #[default]
    Multi,
}

impl DisplayMode {
    /// Whether secondary columns can be selected in this mode
    pub fn allows_secondary(self) -> bool {
        matches!(self, DisplayMode::Multi)
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Single => f.write_str("single"),
            DisplayMode::Multi => f.write_str("multi"),
        }
    }
}

/// Unrecognized display mode name
#[derive(Debug, Error)]
#[error("unknown display mode '{0}' (expected 'single' or 'multi')")]
pub struct ParseDisplayModeError(String);

impl FromStr for DisplayMode {
    type Err = ParseDisplayModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(DisplayMode::Single),
            "multi" => Ok(DisplayMode::Multi),
            other => Err(ParseDisplayModeError(other.to_string())),
        }
    }
}

/// A column name with the document's value for it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CardField {
    pub column: String,
    pub value: Option<CellValue>,
}

/// What the classification view shows for one document
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Card {
    pub id: Option<RecordId>,
    pub primary: CardField,
    pub secondary: Vec<CardField>,
    pub label: Option<String>,
}

/// Resolved display layout for a set of columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    mode: DisplayMode,
    primary: Option<String>,
    secondary: Vec<String>,
}

impl DisplayConfig {
    /// Build the layout from stored column flags
    ///
    /// Secondary flags are ignored in single mode.
    pub fn from_columns(columns: &[Column], mode: DisplayMode) -> Self {
        let primary = columns.iter().find(|c| c.primary).map(|c| c.name.clone());
        let secondary = if mode.allows_secondary() {
            columns
                .iter()
                .filter(|c| c.secondary && !c.primary)
                .map(|c| c.name.clone())
                .collect()
        } else {
            Vec::new()
        };

        Self {
            mode,
            primary,
            secondary,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Name of the primary column, if one is chosen
    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn secondary(&self) -> &[String] {
        &self.secondary
    }

    /// Lay out one document; `None` when no primary column is chosen
    pub fn card(&self, document: &Document) -> Option<Card> {
        let primary = self.primary.as_ref()?;
        let field = |column: &String| CardField {
            column: column.clone(),
            value: document.get(column).cloned(),
        };

        Some(Card {
            id: document.id,
            primary: field(primary),
            secondary: self.secondary.iter().map(field).collect(),
            label: document.label.clone(),
        })
    }
}
