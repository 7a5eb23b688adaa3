//! Per-document painless scripts
//!
//! Used when a grouping key or metric argument is an expression rather than
//! a plain field, and for filters that compare two computed values.

use serde_json::{json, Value};

use crate::statement::{BinaryOp, Expr};

use super::errors::{TranslationError, TranslationResult};

/// `{"lang": "painless", "source": ...}` for a per-document expression
pub(crate) fn script(expr: &Expr) -> TranslationResult<Value> {
    Ok(json!({"lang": "painless", "source": source(expr)?}))
}

/// Renders a painless literal
pub(crate) fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Painless spelling of a binary operator
pub(crate) fn operator(op: BinaryOp) -> TranslationResult<&'static str> {
    Ok(match op {
        BinaryOp::Eq => "==",
        BinaryOp::NotEq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Plus => "+",
        BinaryOp::Minus => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
        BinaryOp::Modulo => "%",
        BinaryOp::Like => {
            return Err(TranslationError::UnsupportedExpression(
                "LIKE inside a script".into(),
            ))
        }
    })
}

fn source(expr: &Expr) -> TranslationResult<String> {
    match expr {
        Expr::Column(name) => Ok(format!("doc['{}'].value", name)),
        Expr::Literal(value) => Ok(literal(value)),
        Expr::Binary { op, left, right } => Ok(format!(
            "({} {} {})",
            source(left)?,
            operator(*op)?,
            source(right)?
        )),
        Expr::Not(inner) => Ok(format!("!{}", source(inner)?)),
        Expr::Function(call) => {
            let method = match call.upper_name().as_str() {
                "ABS" => "Math.abs",
                "FLOOR" => "Math.floor",
                "CEIL" => "Math.ceil",
                "ROUND" => "Math.round",
                "SQRT" => "Math.sqrt",
                "LOG" => "Math.log",
                _ => return Err(TranslationError::UnsupportedFunction(call.name.clone())),
            };
            let arg = call.single_arg().ok_or_else(|| {
                TranslationError::invalid_arguments(&call.name, "expected one argument")
            })?;
            Ok(format!("{}({})", method, source(arg)?))
        }
        other => Err(TranslationError::UnsupportedExpression(other.to_string())),
    }
}
