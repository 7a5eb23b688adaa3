//! Custom metric extraction
//!
//! Most metrics come back as `{"value": x}` and are copied into rows as-is.
//! Everything else (doc counts, percentiles, stats fields) is read through
//! a `MetricSelector` registered by the metric translator.

use serde_json::Value;

use super::bucket::Bucket;

/// How to read one output column out of a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSelector {
    /// The bucket's `doc_count` (`COUNT(*)`)
    DocCount,
    /// A nested value, e.g. `["latency", "values", "95.0"]`
    Path(Vec<String>),
}

impl MetricSelector {
    pub fn path<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        MetricSelector::Path(segments.into_iter().map(Into::into).collect())
    }

    /// Reads the value; missing values read as null
    pub fn select(&self, bucket: &Bucket) -> Value {
        let found = match self {
            MetricSelector::DocCount => bucket.doc_count().map(Value::from),
            MetricSelector::Path(segments) => bucket.lookup(segments.as_slice()).cloned(),
        };
        found.unwrap_or(Value::Null)
    }

    /// Metric part of a pipeline bucket path pointing at this value
    pub fn bucket_metric(&self) -> String {
        match self {
            MetricSelector::DocCount => "_count".to_string(),
            MetricSelector::Path(segments) => match segments.as_slice() {
                [name, values, key] if values == "values" => format!("{}[{}]", name, key),
                _ => segments.join("."),
            },
        }
    }
}
