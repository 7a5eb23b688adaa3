//! Bucket-level scripts over metrics of the same scope
//!
//! Serves both HAVING (as a `bucket_selector` body) and arithmetic
//! projections such as `SUM(a) / COUNT(*)` (as a `bucket_script`).

use serde_json::{json, Map, Value};

use crate::request::Aggregation;
use crate::statement::{Expr, Statement};

use super::doc_script;
use super::errors::{TranslationError, TranslationResult};

/// `{"buckets_path": {...}, "script": {...}}` for `expr`
pub(crate) fn translate_bucket_script(statement: &Statement, expr: &Expr) -> TranslationResult<Value> {
    let mut vars = Map::new();
    let source = render(statement, expr, &mut vars)?;
    Ok(json!({
        "buckets_path": vars,
        "script": {"lang": "painless", "source": source},
    }))
}

/// Arithmetic projection as a `bucket_script` aggregation
pub(crate) fn arithmetic(statement: &Statement, expr: &Expr) -> TranslationResult<Aggregation> {
    Ok(Aggregation::new(
        "bucket_script",
        translate_bucket_script(statement, expr)?,
    ))
}

fn render(statement: &Statement, expr: &Expr, vars: &mut Map<String, Value>) -> TranslationResult<String> {
    match expr {
        Expr::Binary { op, left, right } => Ok(format!(
            "{} {} {}",
            operand(statement, left, vars)?,
            doc_script::operator(*op)?,
            operand(statement, right, vars)?
        )),
        Expr::Not(inner) => Ok(format!("!({})", render(statement, inner, vars)?)),
        Expr::Literal(value) => Ok(doc_script::literal(value)),
        Expr::Column(name) => {
            let path = column_path(statement, name)?;
            Ok(bind(vars, name, path))
        }
        Expr::Function(call) if call.is_count_star() => Ok(bind(vars, "_count", "_count".into())),
        Expr::Function(_) => {
            let projection = statement
                .projection_for(expr)
                .ok_or_else(|| TranslationError::UnknownColumn(expr.to_string()))?;
            let name = projection.output_name();
            Ok(bind(vars, &name, name.clone()))
        }
        other => Err(TranslationError::UnsupportedExpression(other.to_string())),
    }
}

fn operand(statement: &Statement, expr: &Expr, vars: &mut Map<String, Value>) -> TranslationResult<String> {
    let rendered = render(statement, expr, vars)?;
    Ok(match expr {
        Expr::Binary { .. } => format!("({})", rendered),
        _ => rendered,
    })
}

/// Resolves an output column to the bucket path of the value behind it
fn column_path(statement: &Statement, name: &str) -> TranslationResult<String> {
    if statement.is_dimension(name) {
        return Ok("_key".to_string());
    }
    let projection = statement
        .projections
        .iter()
        .find(|p| p.output_name() == name)
        .ok_or_else(|| TranslationError::UnknownColumn(name.to_string()))?;
    match &projection.expr {
        Expr::Function(call) if call.is_count_star() => Ok("_count".to_string()),
        Expr::Column(_) => Err(TranslationError::UnknownColumn(name.to_string())),
        _ => Ok(name.to_string()),
    }
}

fn bind(vars: &mut Map<String, Value>, name: &str, path: String) -> String {
    let var = variable(name);
    vars.insert(var.clone(), Value::String(path));
    format!("params.{}", var)
}

/// Painless-safe variable name
fn variable(name: &str) -> String {
    let mut var: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if var.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        var.insert(0, '_');
    }
    var
}
