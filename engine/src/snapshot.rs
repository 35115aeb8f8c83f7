//! Document format for persisting and restoring registries.
//!
//! A document is a JSON object with a single array field named after the
//! registry type (see [`crate::Registry::SCHEMA`]):
//!
//! ```json
//! { "SynList": [ { "name": "water", "synonyms": ["H2O", "water"] } ] }
//! ```
//!
//! Only live items are written. Synonyms are emitted in sorted order so that
//! the same registry state always serializes to the same text.

use crate::{error::Result, Error, Item, Term};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One item of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    /// Canonical name
    pub name: Option<Term>,
    /// Every term of the item
    pub synonyms: Vec<Term>,
}

impl SynonymEntry {
    /// Create an entry.
    pub fn new(name: Option<&str>, synonyms: &[&str]) -> Self {
        Self {
            name: name.map(str::to_string),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<&Item> for SynonymEntry {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            synonyms: item.terms.iter().cloned().collect(),
        }
    }
}

/// Wrap entries in a document under the `schema` field.
pub fn encode(schema: &str, entries: Vec<SynonymEntry>) -> Result<Value> {
    let entries =
        serde_json::to_value(entries).map_err(|e| Error::InvalidDocument(e.to_string()))?;
    let mut document = Map::new();
    document.insert(schema.to_string(), entries);
    Ok(Value::Object(document))
}

/// Extract the entries stored under the `schema` field.
///
/// Other top-level fields, and unknown fields inside entries, are ignored.
pub fn decode(schema: &str, document: &Value) -> Result<Vec<SynonymEntry>> {
    let field = document
        .get(schema)
        .ok_or_else(|| Error::MissingSchemaField(schema.to_string()))?;
    Vec::<SynonymEntry>::deserialize(field).map_err(|e| Error::InvalidDocument(e.to_string()))
}
