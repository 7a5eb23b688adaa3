//! ORDER BY → bucket `order`

use serde_json::{Map, Value};

use crate::statement::{Expr, Statement};

use super::errors::{TranslationError, TranslationResult};

/// Aggregation types whose buckets accept an `order`
const ORDERABLE: &[&str] = &["terms", "histogram", "date_histogram"];

pub(crate) fn translate_sort(
    statement: &Statement,
    agg_type: &str,
    dimension: &str,
) -> TranslationResult<Value> {
    if !ORDERABLE.contains(&agg_type) {
        return Err(TranslationError::UnsupportedExpression(format!(
            "ORDER BY on a {} aggregation",
            agg_type
        )));
    }

    let mut orders = Vec::with_capacity(statement.order_by.len());
    for order in &statement.order_by {
        let key = sort_key(statement, dimension, &order.expr)?;
        let mut entry = Map::new();
        entry.insert(key, Value::String(order.direction().to_string()));
        orders.push(Value::Object(entry));
    }

    Ok(match orders.len() {
        1 => orders.remove(0),
        _ => Value::Array(orders),
    })
}

fn sort_key(statement: &Statement, dimension: &str, expr: &Expr) -> TranslationResult<String> {
    match expr {
        Expr::Column(name) if name == dimension => Ok("_key".to_string()),
        Expr::Column(name) => {
            let projection = statement
                .projections
                .iter()
                .find(|p| &p.output_name() == name)
                .ok_or_else(|| TranslationError::UnknownColumn(name.clone()))?;
            match &projection.expr {
                Expr::Function(call) if call.is_count_star() => Ok("_count".to_string()),
                Expr::Column(_) => Err(TranslationError::UnsupportedExpression(format!(
                    "ORDER BY {} is not the grouped dimension",
                    name
                ))),
                _ => Ok(name.clone()),
            }
        }
        Expr::Function(call) if call.is_count_star() => Ok("_count".to_string()),
        Expr::Function(_) => statement
            .projection_for(expr)
            .map(|p| p.output_name())
            .ok_or_else(|| TranslationError::UnknownColumn(expr.to_string())),
        other => Err(TranslationError::UnsupportedExpression(other.to_string())),
    }
}
