//! Clause translators
//!
//! Each statement clause is turned into an aggregation-DSL fragment by a
//! `ClauseTranslator`. The executor tree only stitches fragments together,
//! so it never needs to know how a particular clause is spelled.
//!
//! `DslTranslator` is the default implementation:
//!
//! - GROUP BY column → `terms`, `date_trunc` → `date_histogram`,
//!   `histogram` → `histogram`, CASE → `filters`, other expressions →
//!   scripted `terms`
//! - aggregate functions → metric aggregations, or `*_bucket` pipelines
//!   when the argument is a metric exported by a nested scope
//! - WHERE → query DSL
//! - HAVING → `bucket_selector` body
//! - ORDER BY → bucket `order`

mod bucket_script;
mod case_when;
mod doc_script;
mod errors;
mod filter;
mod group_by;
mod metric;
mod sort;

pub use errors::{TranslationError, TranslationResult};

use serde_json::Value;

use crate::request::{AggMap, BucketPaths};
use crate::response::MetricSelector;
use crate::statement::{Dimension, Expr, Statement};

/// Default `time_zone` for date histograms
pub const DEFAULT_TIME_ZONE: &str = "+08:00";

/// Metric aggregations of one scope plus the custom extractors its outputs need
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTranslation {
    pub aggs: AggMap,
    /// Output column → how to read it from a bucket
    pub selectors: Vec<(String, MetricSelector)>,
}

/// Translates statement clauses into aggregation DSL fragments
pub trait ClauseTranslator {
    /// Nested bucket aggregations for the dimensions, outer to inner
    fn translate_group_by(&self, dimensions: &[Dimension]) -> TranslationResult<AggMap>;

    /// Metric aggregations for the projections; `paths` holds metrics
    /// exported by nested scopes
    fn translate_metrics(
        &self,
        statement: &Statement,
        paths: &BucketPaths,
    ) -> TranslationResult<MetricTranslation>;

    /// Query DSL for a WHERE expression
    fn translate_filter(&self, filter: &Expr) -> TranslationResult<Value>;

    /// `bucket_selector` body for a HAVING expression
    fn translate_bucket_script(&self, statement: &Statement, having: &Expr)
        -> TranslationResult<Value>;

    /// `order` value for the aggregation grouping by `dimension`
    fn translate_sort(
        &self,
        statement: &Statement,
        agg_type: &str,
        dimension: &str,
    ) -> TranslationResult<Value>;
}

/// Settings shared by every clause of a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorOptions {
    /// Offset applied to date histograms, e.g. `+08:00`
    pub time_zone: String,
    /// `size` for `terms` levels without a LIMIT
    pub default_terms_size: Option<u64>,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            default_terms_size: None,
        }
    }
}

/// Elasticsearch-style DSL translator
#[derive(Debug, Clone, Default)]
pub struct DslTranslator {
    options: TranslatorOptions,
}

impl DslTranslator {
    pub fn new(options: TranslatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }
}

impl ClauseTranslator for DslTranslator {
    fn translate_group_by(&self, dimensions: &[Dimension]) -> TranslationResult<AggMap> {
        group_by::translate_group_by(&self.options, dimensions)
    }

    fn translate_metrics(
        &self,
        statement: &Statement,
        paths: &BucketPaths,
    ) -> TranslationResult<MetricTranslation> {
        metric::translate_metrics(statement, paths)
    }

    fn translate_filter(&self, filter: &Expr) -> TranslationResult<Value> {
        filter::translate_filter(filter)
    }

    fn translate_bucket_script(
        &self,
        statement: &Statement,
        having: &Expr,
    ) -> TranslationResult<Value> {
        bucket_script::translate_bucket_script(statement, having)
    }

    fn translate_sort(
        &self,
        statement: &Statement,
        agg_type: &str,
        dimension: &str,
    ) -> TranslationResult<Value> {
        sort::translate_sort(statement, agg_type, dimension)
    }
}
