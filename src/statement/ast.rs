//! SELECT statement structures
//!
//! Statements arrive already parsed. Executors consume them at tree-build
//! time and never mutate them afterwards.

use serde::{Deserialize, Serialize};

use super::expr::Expr;

/// One entry of the select list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub expr: Expr,
    #[serde(default)]
    pub alias: Option<String>,
}

impl Projection {
    /// Column name this projection is returned under
    pub fn output_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.expr.to_string(),
        }
    }
}

/// One `GROUP BY` output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBy {
    /// Output column name, also the aggregation name
    pub name: String,
    pub expr: Expr,
}

/// One `ORDER BY` term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub expr: Expr,
    #[serde(default)]
    pub descending: bool,
}

impl OrderBy {
    pub fn direction(&self) -> &'static str {
        if self.descending {
            "desc"
        } else {
            "asc"
        }
    }
}

/// A parsed SELECT statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Backend index, or the alias of an earlier statement
    pub source: String,
    #[serde(default)]
    pub projections: Vec<Projection>,
    /// Outer to inner nesting order
    #[serde(default)]
    pub group_by: Vec<GroupBy>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<Expr>,
    #[serde(default)]
    pub having: Option<Expr>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl Statement {
    /// Creates an empty `SELECT ... FROM source`
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            projections: Vec::new(),
            group_by: Vec::new(),
            where_clause: None,
            having: None,
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn select(mut self, expr: Expr) -> Self {
        self.projections.push(Projection { expr, alias: None });
        self
    }

    pub fn select_as(mut self, expr: Expr, alias: impl Into<String>) -> Self {
        self.projections.push(Projection {
            expr,
            alias: Some(alias.into()),
        });
        self
    }

    pub fn group_by(mut self, name: impl Into<String>, expr: Expr) -> Self {
        self.group_by.push(GroupBy {
            name: name.into(),
            expr,
        });
        self
    }

    /// `GROUP BY column`, named after the column
    pub fn group_by_column(self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.group_by(column.clone(), Expr::Column(column))
    }

    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_clause = Some(expr);
        self
    }

    pub fn having(mut self, expr: Expr) -> Self {
        self.having = Some(expr);
        self
    }

    pub fn order_by(mut self, expr: Expr, descending: bool) -> Self {
        self.order_by.push(OrderBy { expr, descending });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if `name` is one of this statement's GROUP BY columns
    pub fn is_dimension(&self, name: &str) -> bool {
        self.group_by.iter().any(|g| g.name == name)
    }

    /// Finds the projection whose expression is `expr`
    pub fn projection_for(&self, expr: &Expr) -> Option<&Projection> {
        self.projections.iter().find(|p| &p.expr == expr)
    }

    /// Returns true if some projection is returned under `name`
    pub fn has_output(&self, name: &str) -> bool {
        self.projections.iter().any(|p| p.output_name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_name_prefers_alias() {
        let stmt = Statement::from_source("quote")
            .select_as(Expr::call("MAX", vec![Expr::column("adj_close")]), "max_adj_close")
            .select(Expr::call("CSUM", vec![Expr::column("max_adj_close")]));

        assert_eq!(stmt.projections[0].output_name(), "max_adj_close");
        assert_eq!(stmt.projections[1].output_name(), "CSUM(max_adj_close)");
    }

    #[test]
    fn test_deserialize_minimal() {
        let stmt: Statement = serde_json::from_value(json!({
            "source": "symbol",
            "where": {"binary": {"op": "eq", "left": {"column": "sector"}, "right": {"literal": "Finance"}}},
            "limit": 5
        }))
        .unwrap();

        assert_eq!(stmt.source, "symbol");
        assert!(stmt.where_clause.is_some());
        assert!(stmt.group_by.is_empty());
        assert_eq!(stmt.limit, Some(5));
    }

    #[test]
    fn test_is_dimension() {
        let stmt = Statement::from_source("symbol").group_by_column("ipo_year");
        assert!(stmt.is_dimension("ipo_year"));
        assert!(!stmt.is_dimension("sector"));
    }
}
