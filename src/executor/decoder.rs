//! Bucket decoder
//!
//! Walks a nested bucket tree along an ordered list of dimension names and
//! materializes one row per innermost bucket reached.

use crate::request::AGG_SEPARATOR;
use crate::response::{AggResult, Bucket, MetricSelector, ResponseError, ResponseResult};

use super::row::Row;

/// Decodes `bucket` along `dimensions`, appending rows to `out`.
///
/// Grouped levels fan out one row per bucket with the dimension value set;
/// single-bucket levels (filters) are descended without adding a value. A
/// missing level yields no rows.
pub(crate) fn collect_rows<'r>(
    bucket: &'r Bucket,
    dimensions: &[String],
    seed: Row<'r>,
    selectors: &[(String, MetricSelector)],
    out: &mut Vec<Row<'r>>,
) -> ResponseResult<()> {
    let (dimension, rest) = match dimensions.split_first() {
        Some(split) => split,
        None => {
            out.push(materialize(bucket, seed, selectors));
            return Ok(());
        }
    };

    match bucket.get(dimension) {
        None => Ok(()),
        Some(AggResult::Grouped(buckets)) => {
            for (key, child) in buckets.keyed() {
                let mut row = seed.clone();
                row.values.insert(dimension.clone(), key);
                collect_rows(child, rest, row, selectors, out)?;
            }
            Ok(())
        }
        Some(AggResult::Single(inner)) => collect_rows(inner, rest, seed, selectors, out),
        Some(_) => Err(ResponseError::malformed(format!(
            "'{}' is not a bucket aggregation",
            qualified(&seed.scope_path, dimension)
        ))),
    }
}

/// `dimension` prefixed with the branches traversed to reach it
fn qualified(scope_path: &[String], dimension: &str) -> String {
    let mut segments: Vec<&str> = scope_path.iter().map(String::as_str).collect();
    segments.push(dimension);
    segments.join(AGG_SEPARATOR)
}

fn materialize<'r>(
    bucket: &'r Bucket,
    mut row: Row<'r>,
    selectors: &[(String, MetricSelector)],
) -> Row<'r> {
    for (name, value) in bucket.metric_values() {
        row.values.insert(name.to_string(), value.clone());
    }
    for (name, selector) in selectors {
        row.values.insert(name.clone(), selector.select(bucket));
    }
    row.bucket = Some(bucket);
    row
}
