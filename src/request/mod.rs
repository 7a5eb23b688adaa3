//! Search request model
//!
//! The request is the only thing sent to the backend: `size` is always 0
//! (aggregations only, no hits), an optional top-level `query`, and the
//! aggregation tree.

mod aggregation;
mod bucket_path;

pub use aggregation::{AggMap, Aggregation};
pub use bucket_path::{bucket_path, BucketPaths, AGG_SEPARATOR, METRIC_SEPARATOR};

use serde::Serialize;
use serde_json::Value;

/// A complete aggregation search request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchRequest {
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(skip_serializing_if = "AggMap::is_empty")]
    pub aggs: AggMap,
}

impl SearchRequest {
    /// Request with no hits and the given aggregations
    pub fn aggregations(aggs: AggMap) -> Self {
        Self {
            size: 0,
            query: None,
            aggs,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
