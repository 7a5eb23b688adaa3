//! Backend response model
//!
//! A raw search response is parsed once into a `SearchResponse` whose root
//! bucket is the top-level `aggregations` mapping plus a synthetic
//! `doc_count` equal to the total hit count.

mod bucket;
mod errors;
mod selector;

pub use bucket::{AggResult, Bucket, Buckets};
pub use errors::{ResponseError, ResponseResult};
pub use selector::MetricSelector;

use serde_json::Value;

/// Parsed backend response
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    total_hits: u64,
    root: Bucket,
}

impl SearchResponse {
    /// Parses `{"hits": {"total": ...}, "aggregations": {...}}`.
    ///
    /// `hits.total` may be a number or `{"value": n}`. A missing
    /// `aggregations` mapping is treated as empty.
    pub fn from_json(value: Value) -> ResponseResult<Self> {
        let total_hits = match value.get("hits").and_then(|hits| hits.get("total")) {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
            _ => None,
        }
        .ok_or(ResponseError::MissingTotal)?;

        let mut root = match value.get("aggregations") {
            None | Some(Value::Null) => Bucket::default(),
            Some(Value::Object(aggregations)) => Bucket::from_map(aggregations.clone())?,
            Some(other) => {
                return Err(ResponseError::malformed(format!(
                    "aggregations is not an object: {}",
                    other
                )))
            }
        };
        root.insert("doc_count", AggResult::Scalar(Value::from(total_hits)));

        Ok(Self { total_hits, root })
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// The seed bucket for the leaf scope
    pub fn root_bucket(&self) -> &Bucket {
        &self.root
    }
}
