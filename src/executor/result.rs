//! Result types for tree execution

use serde::Serialize;
use serde_json::{Map, Value};

use super::row::Row;

/// Flat rows produced by executing a tree
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    /// Rows in seed order, then backend bucket order
    pub rows: Vec<Map<String, Value>>,
}

impl ResultSet {
    /// Creates an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Strips decode-time state from every row
    pub fn from_rows(rows: Vec<Row<'_>>) -> Self {
        Self {
            rows: rows.into_iter().map(Row::into_values).collect(),
        }
    }

    /// Returns true if no rows were produced
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns an iterator over the rows
    pub fn iter(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.rows.iter()
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.rows.iter().cloned().map(Value::Object).collect())
    }
}
