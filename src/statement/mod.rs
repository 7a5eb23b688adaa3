//! Statement model for aggtree
//!
//! Statements are produced by an external SQL parser (or deserialized from
//! JSON) and consumed by the executor tree. This module only describes them.

mod ast;
mod expr;

pub use ast::{GroupBy, OrderBy, Projection, Statement};
pub use expr::{BinaryOp, Expr, FunctionCall, WhenClause};

/// What a grouping level buckets documents by
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// A GROUP BY expression
    Expr(Expr),
    /// A branch WHERE clause turned into a single filter bucket
    Filter(Expr),
}

/// One nesting level of a compiled scope, in outer-to-inner order
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub key: GroupKey,
}

impl Dimension {
    pub fn grouped(name: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            key: GroupKey::Expr(expr),
        }
    }

    pub fn filter(name: impl Into<String>, filter: Expr) -> Self {
        Self {
            name: name.into(),
            key: GroupKey::Filter(filter),
        }
    }

    /// Returns true for synthetic filter levels
    pub fn is_filter(&self) -> bool {
        matches!(self.key, GroupKey::Filter(_))
    }
}

impl From<&GroupBy> for Dimension {
    fn from(group_by: &GroupBy) -> Self {
        Self::grouped(group_by.name.clone(), group_by.expr.clone())
    }
}
