//! Expression tree shared by projections, filters, grouping keys and HAVING.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Like,
}

impl BinaryOp {
    /// SQL spelling, used for canonical output names
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Like => "LIKE",
        }
    }

    /// Returns true for `=`, `!=`, `<`, `<=`, `>`, `>=`
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    /// Returns true for `+`, `-`, `*`, `/`, `%`
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo
        )
    }

    /// Operator with its operands swapped (`1 < a` becomes `a > 1`)
    pub fn flipped(&self) -> Self {
        match self {
            BinaryOp::Lt => BinaryOp::Gt,
            BinaryOp::LtEq => BinaryOp::GtEq,
            BinaryOp::Gt => BinaryOp::Lt,
            BinaryOp::GtEq => BinaryOp::LtEq,
            other => *other,
        }
    }
}

/// A function call such as `SUM(market_cap)` or `date_trunc('year', date)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Expr>,
    #[serde(default)]
    pub distinct: bool,
}

impl FunctionCall {
    /// Upper-cased function name
    pub fn upper_name(&self) -> String {
        self.name.to_ascii_uppercase()
    }

    /// Returns the single argument, if there is exactly one
    pub fn single_arg(&self) -> Option<&Expr> {
        match self.args.as_slice() {
            [arg] => Some(arg),
            _ => None,
        }
    }

    /// `COUNT(*)` or `COUNT()`
    pub fn is_count_star(&self) -> bool {
        self.upper_name() == "COUNT"
            && !self.distinct
            && matches!(self.args.as_slice(), [] | [Expr::Wildcard])
    }
}

/// One `WHEN <condition> THEN <result>` arm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
}

/// Parsed SQL expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Column(String),
    Literal(Value),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    InList {
        expr: Box<Expr>,
        list: Vec<Value>,
        #[serde(default)]
        negated: bool,
    },
    IsNull {
        expr: Box<Expr>,
        #[serde(default)]
        negated: bool,
    },
    Function(FunctionCall),
    Case {
        branches: Vec<WhenClause>,
        #[serde(default)]
        else_result: Option<Box<Expr>>,
    },
    /// `*`
    Wildcard,
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Eq, left, right)
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::And, left, right)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Or, left, right)
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function(FunctionCall {
            name: name.into(),
            args,
            distinct: false,
        })
    }

    pub fn call_distinct(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function(FunctionCall {
            name: name.into(),
            args,
            distinct: true,
        })
    }

    /// `COUNT(*)`
    pub fn count_star() -> Self {
        Self::call("COUNT", vec![Expr::Wildcard])
    }

    /// Column name if this is a bare column reference
    pub fn as_column(&self) -> Option<&str> {
        match self {
            Expr::Column(name) => Some(name),
            _ => None,
        }
    }

    /// Visits every column referenced by this expression, left to right
    pub fn walk_columns<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            Expr::Column(name) => visit(name),
            Expr::Literal(_) | Expr::Wildcard => {}
            Expr::Binary { left, right, .. } => {
                left.walk_columns(visit);
                right.walk_columns(visit);
            }
            Expr::Not(inner) => inner.walk_columns(visit),
            Expr::InList { expr, .. } | Expr::IsNull { expr, .. } => expr.walk_columns(visit),
            Expr::Function(call) => {
                for arg in &call.args {
                    arg.walk_columns(visit);
                }
            }
            Expr::Case {
                branches,
                else_result,
            } => {
                for branch in branches {
                    branch.condition.walk_columns(visit);
                    branch.result.walk_columns(visit);
                }
                if let Some(result) = else_result {
                    result.walk_columns(visit);
                }
            }
        }
    }
}

fn fmt_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        Value::Null => write!(f, "NULL"),
        other => write!(f, "{}", other),
    }
}

/// Canonical SQL text; unaliased projections are named by it.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Literal(value) => fmt_literal(f, value),
            Expr::Binary { op, left, right } => write!(f, "{} {} {}", left, op.as_str(), right),
            Expr::Not(inner) => write!(f, "NOT {}", inner),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                write!(f, "{}{} IN (", expr, if *negated { " NOT" } else { "" })?;
                for (i, value) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_literal(f, value)?;
                }
                write!(f, ")")
            }
            Expr::IsNull { expr, negated } => {
                write!(f, "{} IS {}NULL", expr, if *negated { "NOT " } else { "" })
            }
            Expr::Function(call) => {
                write!(f, "{}(", call.name)?;
                if call.distinct {
                    write!(f, "DISTINCT ")?;
                }
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Case {
                branches,
                else_result,
            } => {
                write!(f, "CASE")?;
                for branch in branches {
                    write!(f, " WHEN {} THEN {}", branch.condition, branch.result)?;
                }
                if let Some(result) = else_result {
                    write!(f, " ELSE {}", result)?;
                }
                write!(f, " END")
            }
            Expr::Wildcard => write!(f, "*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_function_display() {
        let expr = Expr::call("CSUM", vec![Expr::column("max_adj_close")]);
        assert_eq!(expr.to_string(), "CSUM(max_adj_close)");

        let expr = Expr::call_distinct("COUNT", vec![Expr::column("symbol")]);
        assert_eq!(expr.to_string(), "COUNT(DISTINCT symbol)");

        assert_eq!(Expr::count_star().to_string(), "COUNT(*)");
    }

    #[test]
    fn test_literal_quoting() {
        let expr = Expr::eq(Expr::column("sector"), Expr::lit("Fin'ance"));
        assert_eq!(expr.to_string(), "sector = 'Fin''ance'");
    }

    #[test]
    fn test_count_star_detection() {
        let call = FunctionCall {
            name: "count".into(),
            args: vec![],
            distinct: false,
        };
        assert!(call.is_count_star());

        let call = FunctionCall {
            name: "COUNT".into(),
            args: vec![Expr::column("x")],
            distinct: false,
        };
        assert!(!call.is_count_star());
    }

    #[test]
    fn test_walk_columns_order() {
        let expr = Expr::and(
            Expr::eq(Expr::column("a"), Expr::lit(1)),
            Expr::binary(BinaryOp::Gt, Expr::column("b"), Expr::column("c")),
        );
        let mut seen = Vec::new();
        expr.walk_columns(&mut |name| seen.push(name));
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_json_shape() {
        let expr: Expr = serde_json::from_value(json!({
            "binary": {"op": "eq", "left": {"column": "sector"}, "right": {"literal": "Finance"}}
        }))
        .unwrap();
        assert_eq!(expr, Expr::eq(Expr::column("sector"), Expr::lit("Finance")));
    }
}
