//! Bucket tree decoded from a backend aggregation response
//!
//! Every aggregation result is classified once, when the response is
//! parsed, so the row decoder can match on shapes instead of probing JSON.

use serde_json::{Map, Value};

use super::errors::{ResponseError, ResponseResult};

/// One aggregation result inside a bucket
#[derive(Debug, Clone, PartialEq)]
pub enum AggResult {
    /// Plain value such as `doc_count` or `key`
    Scalar(Value),
    /// Single-value metric (`{"value": ...}`), raw object kept
    Metric(Map<String, Value>),
    /// Multi-bucket result (`{"buckets": ...}`)
    Grouped(Buckets),
    /// Single-bucket wrapper (filter style) or a multi-value metric object
    Single(Bucket),
}

impl AggResult {
    fn from_json(value: Value) -> ResponseResult<Self> {
        let mut object = match value {
            Value::Object(object) => object,
            other => return Ok(AggResult::Scalar(other)),
        };

        if let Some(buckets) = object.remove("buckets") {
            return Ok(AggResult::Grouped(Buckets::from_json(buckets)?));
        }
        if object.contains_key("value") {
            return Ok(AggResult::Metric(object));
        }
        Ok(AggResult::Single(Bucket::from_map(object)?))
    }

    /// `value` of a single-value metric
    pub fn metric_value(&self) -> Option<&Value> {
        match self {
            AggResult::Metric(object) => object.get("value"),
            _ => None,
        }
    }

    pub fn as_bucket(&self) -> Option<&Bucket> {
        match self {
            AggResult::Single(bucket) => Some(bucket),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            AggResult::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

/// The two shapes of a multi-bucket result
#[derive(Debug, Clone, PartialEq)]
pub enum Buckets {
    /// terms / histogram style; each bucket carries its own `key`
    List(Vec<Bucket>),
    /// filters style; the mapping key is the bucket key
    Keyed(Vec<(String, Bucket)>),
}

impl Buckets {
    fn from_json(value: Value) -> ResponseResult<Self> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(object) => Bucket::from_map(object),
                    other => Err(ResponseError::malformed(format!(
                        "bucket list element is not an object: {}",
                        other
                    ))),
                })
                .collect::<ResponseResult<Vec<_>>>()
                .map(Buckets::List),
            Value::Object(object) => object
                .into_iter()
                .map(|(key, item)| match item {
                    Value::Object(inner) => Ok((key, Bucket::from_map(inner)?)),
                    other => Err(ResponseError::malformed(format!(
                        "keyed bucket '{}' is not an object: {}",
                        key, other
                    ))),
                })
                .collect::<ResponseResult<Vec<_>>>()
                .map(Buckets::Keyed),
            other => Err(ResponseError::malformed(format!(
                "buckets is neither a list nor a mapping: {}",
                other
            ))),
        }
    }

    /// (grouping value, bucket) pairs in backend order
    pub fn keyed(&self) -> Vec<(Value, &Bucket)> {
        match self {
            Buckets::List(buckets) => buckets
                .iter()
                .map(|bucket| (bucket.key().cloned().unwrap_or(Value::Null), bucket))
                .collect(),
            Buckets::Keyed(buckets) => buckets
                .iter()
                .map(|(key, bucket)| (Value::String(key.clone()), bucket))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Buckets::List(buckets) => buckets.len(),
            Buckets::Keyed(buckets) => buckets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A bucket: an ordered set of named aggregation results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bucket {
    entries: Vec<(String, AggResult)>,
}

impl Bucket {
    pub fn from_map(object: Map<String, Value>) -> ResponseResult<Self> {
        let entries = object
            .into_iter()
            .map(|(name, value)| Ok((name, AggResult::from_json(value)?)))
            .collect::<ResponseResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&AggResult> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    /// Inserts or replaces an entry
    pub fn insert(&mut self, name: impl Into<String>, result: AggResult) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = result,
            None => self.entries.push((name, result)),
        }
    }

    /// Grouping value: `key_as_string` when present, else `key`
    pub fn key(&self) -> Option<&Value> {
        self.get("key_as_string")
            .and_then(AggResult::as_scalar)
            .or_else(|| self.get("key").and_then(AggResult::as_scalar))
    }

    pub fn doc_count(&self) -> Option<u64> {
        self.get("doc_count")
            .and_then(AggResult::as_scalar)
            .and_then(Value::as_u64)
    }

    /// Every single-value metric in this bucket, in order
    pub fn metric_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter_map(|(name, result)| result.metric_value().map(|v| (name.as_str(), v)))
    }

    /// Follows nested objects by name and returns the value at the end.
    /// A path ending at a metric returns the metric's `value`.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for name in parents {
            current = current.get(name.as_ref())?.as_bucket()?;
        }
        match current.get(last.as_ref())? {
            AggResult::Scalar(value) => Some(value),
            AggResult::Metric(object) => object.get("value"),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bucket(value: Value) -> Bucket {
        match value {
            Value::Object(object) => Bucket::from_map(object).unwrap(),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_classification() {
        let b = bucket(json!({
            "doc_count": 10,
            "sum_this_year": {"value": 42.5},
            "ipo_year": {"buckets": [{"key": 2001, "doc_count": 3}]},
            "finance": {"doc_count": 4},
            "by_sector": {"buckets": {"tech": {"doc_count": 1}}}
        }));

        assert_eq!(b.doc_count(), Some(10));
        assert!(matches!(b.get("sum_this_year"), Some(AggResult::Metric(_))));
        assert!(matches!(b.get("ipo_year"), Some(AggResult::Grouped(Buckets::List(_)))));
        assert!(matches!(b.get("finance"), Some(AggResult::Single(_))));
        assert!(matches!(b.get("by_sector"), Some(AggResult::Grouped(Buckets::Keyed(_)))));
    }

    #[test]
    fn test_key_prefers_key_as_string() {
        let b = bucket(json!({"key": 1420070400000i64, "key_as_string": "2015", "doc_count": 1}));
        assert_eq!(b.key(), Some(&json!("2015")));

        let b = bucket(json!({"key": 2001, "doc_count": 1}));
        assert_eq!(b.key(), Some(&json!(2001)));
    }

    #[test]
    fn test_keyed_buckets_use_mapping_key() {
        let b = bucket(json!({"by_sector": {"buckets": {"tech": {"doc_count": 1}, "energy": {"doc_count": 2}}}}));
        let Some(AggResult::Grouped(buckets)) = b.get("by_sector") else {
            panic!("expected grouped result");
        };
        let keys: Vec<Value> = buckets.keyed().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![json!("tech"), json!("energy")]);
    }

    #[test]
    fn test_metric_values_skip_non_metrics() {
        let b = bucket(json!({"doc_count": 3, "a": {"value": 1}, "b": {"value": null}, "c": {"count": 2}}));
        let names: Vec<&str> = b.metric_values().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_lookup_nested() {
        let b = bucket(json!({
            "latency": {"values": {"50.0": 12.5}},
            "stats": {"count": 2, "max": 9.0},
            "avg_price": {"value": 3.5}
        }));
        assert_eq!(b.lookup(&["latency", "values", "50.0"]), Some(&json!(12.5)));
        assert_eq!(b.lookup(&["stats", "max"]), Some(&json!(9.0)));
        assert_eq!(b.lookup(&["avg_price"]), Some(&json!(3.5)));
        assert_eq!(b.lookup(&["missing"]), None);
    }

    #[test]
    fn test_rejects_scalar_bucket_element() {
        let object = json!({"ipo_year": {"buckets": [1, 2]}});
        let Value::Object(object) = object else { unreachable!() };
        assert!(Bucket::from_map(object).is_err());
    }
}
