//! Record collections
//!
//! Binds each record type to the table it lives in.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Store-assigned record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// The four record collections of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Documents,
    Columns,
    Labels,
    DocumentMetadata,
}

impl Collection {
    /// Every collection, in creation order
    pub const ALL: [Collection; 4] = [
        Collection::Documents,
        Collection::Labels,
        Collection::Columns,
        Collection::DocumentMetadata,
    ];

    /// Backing table name
    pub fn table_name(self) -> &'static str {
        match self {
            Collection::Documents => "documents",
            Collection::Columns => "columns",
            Collection::Labels => "labels",
            Collection::DocumentMetadata => "document_metadata",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A type that can be stored in one of the collections
pub trait Record: Serialize + DeserializeOwned + Send + 'static {
    /// The collection holding records of this type
    const COLLECTION: Collection;

    /// Identifier, if the record has been stored
    fn id(&self) -> Option<RecordId>;

    /// Attach the store-assigned identifier
    fn set_id(&mut self, id: RecordId);
}
