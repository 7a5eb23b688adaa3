//! Projections → metric and pipeline aggregations

use serde_json::{json, Value};

use crate::request::{Aggregation, BucketPaths};
use crate::response::MetricSelector;
use crate::statement::{Expr, FunctionCall, Statement};

use super::bucket_script;
use super::doc_script;
use super::errors::{TranslationError, TranslationResult};
use super::MetricTranslation;

pub(crate) fn translate_metrics(
    statement: &Statement,
    paths: &BucketPaths,
) -> TranslationResult<MetricTranslation> {
    let mut out = MetricTranslation::default();
    for projection in &statement.projections {
        let name = projection.output_name();
        match &projection.expr {
            Expr::Column(_) | Expr::Wildcard | Expr::Literal(_) => continue,
            Expr::Function(call) => translate_call(paths, name, call, &mut out)?,
            expr @ Expr::Binary { op, .. } if op.is_arithmetic() => {
                out.aggs.insert(name, bucket_script::arithmetic(statement, expr)?);
            }
            other => return Err(TranslationError::UnsupportedExpression(other.to_string())),
        }
    }
    Ok(out)
}

fn translate_call(
    paths: &BucketPaths,
    name: String,
    call: &FunctionCall,
    out: &mut MetricTranslation,
) -> TranslationResult<()> {
    if call.is_count_star() {
        out.selectors.push((name, MetricSelector::DocCount));
        return Ok(());
    }

    let function = call.upper_name();
    match function.as_str() {
        "COUNT" => {
            let field = field_arg(call)?;
            let agg_type = if call.distinct { "cardinality" } else { "value_count" };
            out.aggs.insert(name, Aggregation::new(agg_type, json!({"field": field})));
        }
        "SUM" | "MAX" | "MIN" | "AVG" => {
            let agg_type = function.to_ascii_lowercase();
            let arg = call.single_arg().ok_or_else(|| {
                TranslationError::invalid_arguments(&call.name, "expected one argument")
            })?;
            let exported = arg.as_column().and_then(|column| paths.get(column));
            let aggregation = match (exported, arg.as_column()) {
                // a metric exported by a child scope
                (Some(path), _) => Aggregation::new(
                    format!("{}_bucket", agg_type),
                    json!({ "buckets_path": path }),
                ),
                (None, Some(column)) => Aggregation::new(agg_type, json!({ "field": column })),
                (None, None) => {
                    Aggregation::new(agg_type, json!({"script": doc_script::script(arg)?}))
                }
            };
            out.aggs.insert(name, aggregation);
        }
        "CSUM" => {
            out.aggs.insert(name, pipeline("cumulative_sum", call)?);
        }
        "DERIVATIVE" => {
            out.aggs.insert(name, pipeline("derivative", call)?);
        }
        "MOVING_AVG" => {
            out.aggs.insert(name, pipeline("moving_avg", call)?);
        }
        "PERCENTILE" => match call.args.as_slice() {
            [Expr::Column(field), Expr::Literal(Value::Number(percent))] => {
                let percent = percent.as_f64().ok_or_else(|| {
                    TranslationError::invalid_arguments(&call.name, "percent must be numeric")
                })?;
                out.aggs.insert(
                    name.clone(),
                    Aggregation::new("percentiles", json!({"field": field, "percents": [percent]})),
                );
                let key = format!("{:?}", percent);
                out.selectors
                    .push((name.clone(), MetricSelector::path([name, "values".to_string(), key])));
            }
            _ => {
                return Err(TranslationError::invalid_arguments(
                    &call.name,
                    "expected percentile(<column>, <percent>)",
                ))
            }
        },
        _ => return Err(TranslationError::UnsupportedFunction(call.name.clone())),
    }
    Ok(())
}

/// Sibling pipeline over a metric of the same scope
fn pipeline(agg_type: &str, call: &FunctionCall) -> TranslationResult<Aggregation> {
    let metric = field_arg(call)?;
    Ok(Aggregation::new(agg_type, json!({"buckets_path": metric})))
}

fn field_arg(call: &FunctionCall) -> TranslationResult<&str> {
    call.single_arg()
        .and_then(Expr::as_column)
        .ok_or_else(|| TranslationError::invalid_arguments(&call.name, "expected a column name"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_over_field() {
        let statement = Statement::from_source("symbol")
            .select(Expr::column("ipo_year"))
            .select_as(Expr::call("sum", vec![Expr::column("market_cap")]), "sum_this_year")
            .group_by_column("ipo_year");
        let out = translate_metrics(&statement, &BucketPaths::new()).unwrap();

        assert_eq!(
            out.aggs.to_value(),
            json!({"sum_this_year": {"sum": {"field": "market_cap"}}})
        );
        assert!(out.selectors.is_empty());
    }

    #[test]
    fn test_max_over_child_metric_is_pipeline() {
        let statement = Statement::from_source("per_ipo_year")
            .select_as(Expr::call("max", vec![Expr::column("sum_this_year")]), "max_all_times");
        let mut paths = BucketPaths::new();
        paths.insert("sum_this_year", "ipo_year.sum_this_year");

        let out = translate_metrics(&statement, &paths).unwrap();
        assert_eq!(
            out.aggs.to_value(),
            json!({"max_all_times": {"max_bucket": {"buckets_path": "ipo_year.sum_this_year"}}})
        );
    }

    #[test]
    fn test_counts() {
        let statement = Statement::from_source("symbol")
            .select(Expr::count_star())
            .select_as(Expr::call("count", vec![Expr::column("ipo_year")]), "n")
            .select_as(Expr::call_distinct("count", vec![Expr::column("sector")]), "sectors");
        let out = translate_metrics(&statement, &BucketPaths::new()).unwrap();

        assert_eq!(
            out.aggs.to_value(),
            json!({
                "n": {"value_count": {"field": "ipo_year"}},
                "sectors": {"cardinality": {"field": "sector"}}
            })
        );
        assert_eq!(
            out.selectors,
            vec![("COUNT(*)".to_string(), MetricSelector::DocCount)]
        );
    }

    #[test]
    fn test_cumulative_pipelines() {
        let statement = Statement::from_source("quote")
            .select_as(Expr::call("max", vec![Expr::column("adj_close")]), "max_adj_close")
            .select(Expr::call("CSUM", vec![Expr::column("max_adj_close")]))
            .select(Expr::call("DERIVATIVE", vec![Expr::column("max_adj_close")]))
            .select(Expr::call("moving_avg", vec![Expr::column("max_adj_close")]));
        let out = translate_metrics(&statement, &BucketPaths::new()).unwrap();

        assert_eq!(
            out.aggs.to_value(),
            json!({
                "max_adj_close": {"max": {"field": "adj_close"}},
                "CSUM(max_adj_close)": {"cumulative_sum": {"buckets_path": "max_adj_close"}},
                "DERIVATIVE(max_adj_close)": {"derivative": {"buckets_path": "max_adj_close"}},
                "moving_avg(max_adj_close)": {"moving_avg": {"buckets_path": "max_adj_close"}}
            })
        );
    }

    #[test]
    fn test_percentile_selector() {
        let statement = Statement::from_source("quote")
            .select_as(Expr::call("percentile", vec![Expr::column("close"), Expr::lit(50)]), "median");
        let out = translate_metrics(&statement, &BucketPaths::new()).unwrap();

        assert_eq!(
            out.aggs.to_value(),
            json!({"median": {"percentiles": {"field": "close", "percents": [50.0]}}})
        );
        assert_eq!(
            out.selectors,
            vec![(
                "median".to_string(),
                MetricSelector::path(["median", "values", "50.0"])
            )]
        );
    }

    #[test]
    fn test_unknown_function() {
        let statement = Statement::from_source("quote")
            .select(Expr::call("stddev_pop", vec![Expr::column("close")]));
        assert_eq!(
            translate_metrics(&statement, &BucketPaths::new()).unwrap_err(),
            TranslationError::UnsupportedFunction("stddev_pop".into())
        );
    }
}
