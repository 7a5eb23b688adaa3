//! Rows under construction
//!
//! Output values and decode-time state live in separate fields; only
//! `values` survives into the result set.

use serde_json::{Map, Value};

use crate::response::Bucket;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row<'r> {
    /// Output column → value
    pub values: Map<String, Value>,
    /// Values contributed by filter-only descendants, merged at the end
    pub filtered: Map<String, Value>,
    /// Bucket this row was materialized from
    pub bucket: Option<&'r Bucket>,
    /// Aliases of the drill-down branches traversed so far
    pub scope_path: Vec<String>,
}

impl<'r> Row<'r> {
    /// Empty seed row anchored at `bucket`
    pub fn seed(bucket: &'r Bucket) -> Self {
        Self {
            bucket: Some(bucket),
            ..Self::default()
        }
    }

    /// Copy of this row for a drill-down branch, with `alias` appended to
    /// the scope path
    pub fn descend(&self, alias: Option<&str>) -> Self {
        let mut row = self.clone();
        if let Some(alias) = alias {
            row.scope_path.push(alias.to_string());
        }
        row
    }

    /// Moves staged filter-only values into the output values
    pub fn flush_filtered(&mut self) {
        let filtered = std::mem::take(&mut self.filtered);
        self.values.extend(filtered);
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }
}
