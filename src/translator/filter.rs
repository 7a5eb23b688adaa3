//! WHERE expressions → query DSL
//!
//! The same translation serves the leaf's top-level `query` and the body of
//! a branch's `filter` aggregation.

use serde_json::{json, Map, Value};

use crate::statement::{BinaryOp, Expr};

use super::doc_script;
use super::errors::{TranslationError, TranslationResult};

pub(crate) fn translate_filter(expr: &Expr) -> TranslationResult<Value> {
    match expr {
        Expr::Binary {
            op: BinaryOp::And,
            ..
        } => {
            let mut clauses = Vec::new();
            flatten(expr, BinaryOp::And, &mut clauses)?;
            Ok(json!({"bool": {"filter": clauses}}))
        }
        Expr::Binary {
            op: BinaryOp::Or, ..
        } => {
            let mut clauses = Vec::new();
            flatten(expr, BinaryOp::Or, &mut clauses)?;
            Ok(json!({"bool": {"should": clauses, "minimum_should_match": 1}}))
        }
        Expr::Binary {
            op: BinaryOp::Like,
            left,
            right,
        } => match (left.as_ref(), right.as_ref()) {
            (Expr::Column(field), Expr::Literal(Value::String(pattern))) => {
                Ok(field_clause("wildcard", field, Value::String(wildcard(pattern))))
            }
            _ => Err(TranslationError::UnsupportedExpression(expr.to_string())),
        },
        Expr::Binary { op, left, right } if op.is_comparison() => {
            match (left.as_ref(), right.as_ref()) {
                (Expr::Column(field), Expr::Literal(value)) => Ok(compare(*op, field, value)),
                (Expr::Literal(value), Expr::Column(field)) => {
                    Ok(compare(op.flipped(), field, value))
                }
                _ => Ok(json!({"script": {"script": doc_script::script(expr)?}})),
            }
        }
        Expr::Not(inner) => Ok(must_not(translate_filter(inner)?)),
        Expr::InList {
            expr: inner,
            list,
            negated,
        } => {
            let field = inner
                .as_column()
                .ok_or_else(|| TranslationError::UnsupportedExpression(expr.to_string()))?;
            let clause = field_clause("terms", field, Value::Array(list.clone()));
            Ok(if *negated { must_not(clause) } else { clause })
        }
        Expr::IsNull {
            expr: inner,
            negated,
        } => {
            let field = inner
                .as_column()
                .ok_or_else(|| TranslationError::UnsupportedExpression(expr.to_string()))?;
            let exists = json!({"exists": {"field": field}});
            Ok(if *negated { exists } else { must_not(exists) })
        }
        Expr::Literal(Value::Bool(true)) => Ok(json!({"match_all": {}})),
        Expr::Literal(Value::Bool(false)) => Ok(must_not(json!({"match_all": {}}))),
        other => Err(TranslationError::UnsupportedExpression(other.to_string())),
    }
}

fn flatten(expr: &Expr, op: BinaryOp, clauses: &mut Vec<Value>) -> TranslationResult<()> {
    match expr {
        Expr::Binary {
            op: inner_op,
            left,
            right,
        } if *inner_op == op => {
            flatten(left, op, clauses)?;
            flatten(right, op, clauses)
        }
        other => {
            clauses.push(translate_filter(other)?);
            Ok(())
        }
    }
}

fn compare(op: BinaryOp, field: &str, value: &Value) -> Value {
    let bound = match op {
        BinaryOp::Eq => return field_clause("term", field, value.clone()),
        BinaryOp::NotEq => return must_not(field_clause("term", field, value.clone())),
        BinaryOp::Lt => "lt",
        BinaryOp::LtEq => "lte",
        BinaryOp::Gt => "gt",
        _ => "gte",
    };
    field_clause("range", field, json!({ bound: value }))
}

fn field_clause(kind: &str, field: &str, value: Value) -> Value {
    let mut inner = Map::new();
    inner.insert(field.to_string(), value);
    let mut outer = Map::new();
    outer.insert(kind.to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn must_not(clause: Value) -> Value {
    json!({"bool": {"must_not": [clause]}})
}

/// SQL LIKE pattern → wildcard pattern
fn wildcard(pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| match c {
            '%' => '*',
            '_' => '?',
            other => other,
        })
        .collect()
}
