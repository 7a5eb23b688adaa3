//! `GROUP BY CASE WHEN ... END` → `filters` aggregation
//!
//! Each arm becomes a named filter bucket labelled with its THEN literal.
//! The ELSE literal, when present, becomes the `other_bucket_key`.

use serde_json::{Map, Value};

use crate::request::Aggregation;
use crate::statement::{Expr, WhenClause};

use super::errors::{TranslationError, TranslationResult};
use super::filter::translate_filter;

pub(crate) fn translate_case(
    branches: &[WhenClause],
    else_result: Option<&Expr>,
) -> TranslationResult<Aggregation> {
    if branches.is_empty() {
        return Err(TranslationError::invalid_arguments(
            "CASE",
            "expected at least one WHEN arm",
        ));
    }

    let mut filters = Map::new();
    for branch in branches {
        let label = label(&branch.result)?;
        if filters.contains_key(&label) {
            return Err(TranslationError::invalid_arguments(
                "CASE",
                format!("duplicate bucket label '{}'", label),
            ));
        }
        filters.insert(label, translate_filter(&branch.condition)?);
    }

    let mut body = Map::new();
    body.insert("filters".to_string(), Value::Object(filters));
    if let Some(other) = else_result {
        body.insert("other_bucket_key".to_string(), Value::String(label(other)?));
    }
    Ok(Aggregation::new("filters", Value::Object(body)))
}

fn label(result: &Expr) -> TranslationResult<String> {
    match result {
        Expr::Literal(Value::String(s)) => Ok(s.clone()),
        Expr::Literal(value @ (Value::Number(_) | Value::Bool(_))) => Ok(value.to_string()),
        other => Err(TranslationError::invalid_arguments(
            "CASE",
            format!("bucket label must be a literal, got {}", other),
        )),
    }
}
