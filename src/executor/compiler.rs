//! Request compiler
//!
//! Compiles one scope into an aggregation fragment:
//!
//! 1. Grouping levels, outer to inner
//! 2. Children, so their exported metric paths are known
//! 3. Metrics, HAVING and child fragments into the innermost level
//! 4. ORDER BY / LIMIT onto the single grouping level

use serde_json::Value;

use crate::request::{bucket_path, AggMap, Aggregation, BucketPaths};
use crate::response::MetricSelector;
use crate::translator::ClauseTranslator;

use super::branch::BranchExecutor;
use super::errors::{ExecutorError, ExecutorResult};
use super::scope::ScopePlan;

/// Raised for ORDER BY / LIMIT without exactly one grouping level
pub const SINGLE_GROUP_BY: &str = "order by can only be applied on single group by";

/// Output of compiling one scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledScope {
    /// Fragment rooted at the scope's outermost level
    pub aggs: AggMap,
    /// Metrics this scope and its descendants define, relative to `aggs`
    pub paths: BucketPaths,
    pub selectors: Vec<(String, MetricSelector)>,
}

pub(crate) fn compile_scope<T: ClauseTranslator + ?Sized>(
    plan: &ScopePlan,
    children: &mut [BranchExecutor],
    translator: &T,
) -> ExecutorResult<CompiledScope> {
    let statement = plan.statement();
    let levels = plan.dimension_names();
    let mut aggs = translator.translate_group_by(plan.dimensions())?;

    let mut child_aggs = AggMap::new();
    let mut child_paths = BucketPaths::new();
    for child in children.iter_mut() {
        let compiled = child.compile(translator)?;
        child_aggs.merge(compiled.aggs);
        child_paths.extend(compiled.paths);
    }

    let metrics = translator.translate_metrics(statement, &child_paths)?;

    let mut paths = BucketPaths::new();
    for name in metrics.aggs.names() {
        paths.insert(name, bucket_path(&levels, name));
    }
    for (name, selector) in &metrics.selectors {
        paths.insert(name.clone(), bucket_path(&levels, &selector.bucket_metric()));
    }
    paths.extend(child_paths.nested_under(&levels));

    let tail = aggs.descend_mut(&levels).ok_or_else(|| {
        ExecutorError::compilation(format!("grouping level '{}' was not produced", levels.join(">")))
    })?;
    tail.merge(metrics.aggs);
    if let Some(having) = &statement.having {
        let selector = translator.translate_bucket_script(statement, having)?;
        tail.insert("having", Aggregation::new("bucket_selector", selector));
    }
    tail.merge(child_aggs);

    apply_order_and_limit(plan, &mut aggs, translator)?;

    Ok(CompiledScope {
        aggs,
        paths,
        selectors: metrics.selectors,
    })
}

/// Attaches `order` / `size` to the scope's only grouping level. The filter
/// level of a branch counts as a level.
fn apply_order_and_limit<T: ClauseTranslator + ?Sized>(
    plan: &ScopePlan,
    aggs: &mut AggMap,
    translator: &T,
) -> ExecutorResult<()> {
    let statement = plan.statement();
    if statement.order_by.is_empty() && statement.limit.is_none() {
        return Ok(());
    }

    let dimension = match plan.dimensions() {
        [dimension] => dimension.name.as_str(),
        _ => return Err(ExecutorError::compilation(SINGLE_GROUP_BY)),
    };
    let aggregation = aggs
        .get_mut(dimension)
        .ok_or_else(|| ExecutorError::compilation(SINGLE_GROUP_BY))?;
    let agg_type = aggregation
        .agg_type()
        .map(str::to_string)
        .ok_or_else(|| ExecutorError::compilation(SINGLE_GROUP_BY))?;

    let order = if statement.order_by.is_empty() {
        None
    } else {
        Some(translator.translate_sort(statement, &agg_type, dimension)?)
    };

    let body = aggregation
        .body_mut(&agg_type)
        .ok_or_else(|| ExecutorError::compilation(SINGLE_GROUP_BY))?;
    if let Some(order) = order {
        body.insert("order".to_string(), order);
    }
    if let Some(limit) = statement.limit {
        body.insert("size".to_string(), Value::from(limit));
    }
    Ok(())
}
