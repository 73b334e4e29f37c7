//! Raw record-store row

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw row from the remote record store.
///
/// The store is schemaless from the client's point of view: every row is an
/// id plus a bag of named fields. Typed access happens in [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Store-assigned record id
    pub id: String,

    /// Named field values
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record with no fields
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Get a field value by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a string field, if present and a string
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Get a numeric field as f64
    pub fn num_field(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(Value::as_f64)
    }

    /// Get a boolean field, defaulting to false when absent
    pub fn bool_field(&self, name: &str) -> bool {
        self.field(name).and_then(Value::as_bool).unwrap_or(false)
    }
}
