//! GROUP BY levels → nested bucket aggregations

use serde_json::{json, Value};

use crate::request::{AggMap, Aggregation};
use crate::statement::{Dimension, Expr, GroupKey};

use super::case_when::translate_case;
use super::doc_script;
use super::errors::{TranslationError, TranslationResult};
use super::filter::translate_filter;
use super::TranslatorOptions;

const DATE_INTERVALS: &[&str] = &[
    "second", "minute", "hour", "day", "week", "month", "quarter", "year",
];

/// Nests the dimensions outer to inner; the result holds at most one entry
pub(crate) fn translate_group_by(
    options: &TranslatorOptions,
    dimensions: &[Dimension],
) -> TranslationResult<AggMap> {
    let mut nested: Option<(String, Aggregation)> = None;
    for dimension in dimensions.iter().rev() {
        let mut aggregation = translate_dimension(options, dimension)?;
        if let Some((name, inner)) = nested.take() {
            aggregation = aggregation.with_child(name, inner);
        }
        nested = Some((dimension.name.clone(), aggregation));
    }

    let mut aggs = AggMap::new();
    if let Some((name, aggregation)) = nested {
        aggs.insert(name, aggregation);
    }
    Ok(aggs)
}

fn translate_dimension(
    options: &TranslatorOptions,
    dimension: &Dimension,
) -> TranslationResult<Aggregation> {
    match &dimension.key {
        GroupKey::Filter(filter) => Ok(Aggregation::new("filter", translate_filter(filter)?)),
        GroupKey::Expr(expr) => translate_key(options, expr),
    }
}

fn translate_key(options: &TranslatorOptions, expr: &Expr) -> TranslationResult<Aggregation> {
    match expr {
        Expr::Column(field) => Ok(terms(options, json!({"field": field}))),
        Expr::Function(call) if call.upper_name() == "DATE_TRUNC" => match call.args.as_slice() {
            [Expr::Literal(Value::String(unit)), Expr::Column(field)] => {
                let unit = unit.to_ascii_lowercase();
                if !DATE_INTERVALS.contains(&unit.as_str()) {
                    return Err(TranslationError::InvalidInterval(unit));
                }
                Ok(Aggregation::new(
                    "date_histogram",
                    json!({"field": field, "interval": unit, "time_zone": options.time_zone}),
                ))
            }
            _ => Err(TranslationError::invalid_arguments(
                &call.name,
                "expected date_trunc('<unit>', <column>)",
            )),
        },
        Expr::Function(call) if call.upper_name() == "HISTOGRAM" => match call.args.as_slice() {
            [Expr::Column(field), Expr::Literal(interval @ Value::Number(_))] => Ok(
                Aggregation::new("histogram", json!({"field": field, "interval": interval})),
            ),
            _ => Err(TranslationError::invalid_arguments(
                &call.name,
                "expected histogram(<column>, <interval>)",
            )),
        },
        Expr::Case {
            branches,
            else_result,
        } => translate_case(branches, else_result.as_deref()),
        Expr::Literal(_) | Expr::Wildcard => {
            Err(TranslationError::UnsupportedExpression(format!(
                "cannot group by {}",
                expr
            )))
        }
        other => Ok(terms(
            options,
            json!({"script": doc_script::script(other)?}),
        )),
    }
}

fn terms(options: &TranslatorOptions, mut body: Value) -> Aggregation {
    if let (Some(size), Some(object)) = (options.default_terms_size, body.as_object_mut()) {
        object.insert("size".to_string(), Value::from(size));
    }
    Aggregation::new("terms", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> TranslatorOptions {
        TranslatorOptions::default()
    }

    #[test]
    fn test_nested_terms() {
        let dims = vec![
            Dimension::grouped("exchange", Expr::column("exchange")),
            Dimension::grouped("sector", Expr::column("sector")),
        ];
        let aggs = translate_group_by(&options(), &dims).unwrap();
        assert_eq!(
            aggs.to_value(),
            json!({"exchange": {
                "terms": {"field": "exchange"},
                "aggs": {"sector": {"terms": {"field": "sector"}}}
            }})
        );
    }

    #[test]
    fn test_date_trunc_uses_time_zone() {
        let dims = vec![Dimension::grouped(
            "year",
            Expr::call("date_trunc", vec![Expr::lit("year"), Expr::column("date")]),
        )];
        let aggs = translate_group_by(&options(), &dims).unwrap();
        assert_eq!(
            aggs.to_value(),
            json!({"year": {"date_histogram": {
                "field": "date", "interval": "year", "time_zone": "+08:00"
            }}})
        );
    }

    #[test]
    fn test_bad_interval() {
        let dims = vec![Dimension::grouped(
            "d",
            Expr::call("date_trunc", vec![Expr::lit("fortnight"), Expr::column("date")]),
        )];
        assert_eq!(
            translate_group_by(&options(), &dims).unwrap_err(),
            TranslationError::InvalidInterval("fortnight".into())
        );
    }

    #[test]
    fn test_filter_level_and_default_size() {
        let options = TranslatorOptions {
            default_terms_size: Some(50),
            ..TranslatorOptions::default()
        };
        let dims = vec![
            Dimension::filter("finance", Expr::eq(Expr::column("sector"), Expr::lit("Finance"))),
            Dimension::grouped("ipo_year", Expr::column("ipo_year")),
        ];
        let aggs = translate_group_by(&options, &dims).unwrap();
        assert_eq!(
            aggs.to_value(),
            json!({"finance": {
                "filter": {"term": {"sector": "Finance"}},
                "aggs": {"ipo_year": {"terms": {"field": "ipo_year", "size": 50}}}
            }})
        );
    }

    #[test]
    fn test_expression_key_is_scripted() {
        let dims = vec![Dimension::grouped(
            "decade",
            Expr::binary(
                crate::statement::BinaryOp::Divide,
                Expr::column("ipo_year"),
                Expr::lit(10),
            ),
        )];
        let aggs = translate_group_by(&options(), &dims).unwrap();
        assert_eq!(
            aggs.to_value(),
            json!({"decade": {"terms": {"script": {
                "lang": "painless", "source": "(doc['ipo_year'].value / 10)"
            }}}})
        );
    }

    #[test]
    fn test_empty_dimensions() {
        assert!(translate_group_by(&options(), &[]).unwrap().is_empty());
    }
}
