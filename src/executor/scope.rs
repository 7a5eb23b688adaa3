//! Scope plans and the node behavior shared by leaf and branch executors

use crate::response::{Bucket, MetricSelector};
use crate::statement::{Dimension, Expr, Statement};
use crate::translator::ClauseTranslator;

use super::branch::BranchExecutor;
use super::compiler::{compile_scope, CompiledScope};
use super::decoder::collect_rows;
use super::errors::{ExecutorError, ExecutorResult};
use super::row::Row;

/// Name of the filter level of a branch that has a WHERE but no alias
pub const UNNAMED_FILTER: &str = "filtered";

/// Immutable view of one statement as a scope of the aggregation tree
#[derive(Debug, Clone, PartialEq)]
pub struct ScopePlan {
    statement: Statement,
    dimensions: Vec<Dimension>,
    query: Option<Expr>,
}

impl ScopePlan {
    /// Physical-source scope: WHERE becomes the top-level query
    pub fn leaf(mut statement: Statement) -> Self {
        let query = statement.where_clause.take();
        let dimensions = statement.group_by.iter().map(Dimension::from).collect();
        Self {
            statement,
            dimensions,
            query,
        }
    }

    /// Derived scope: WHERE becomes an outermost filter level named after
    /// the alias
    pub fn branch(mut statement: Statement, alias: Option<&str>) -> Self {
        let mut dimensions = Vec::with_capacity(statement.group_by.len() + 1);
        if let Some(filter) = statement.where_clause.take() {
            dimensions.push(Dimension::filter(alias.unwrap_or(UNNAMED_FILTER), filter));
        }
        dimensions.extend(statement.group_by.iter().map(Dimension::from));
        Self {
            statement,
            dimensions,
            query: None,
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Every nesting level, outer to inner, filter level included
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension_names(&self) -> Vec<String> {
        self.dimensions.iter().map(|d| d.name.clone()).collect()
    }

    /// Top-level query filter (leaf only)
    pub fn query(&self) -> Option<&Expr> {
        self.query.as_ref()
    }

    /// Returns true if the statement declares its own GROUP BY
    pub fn has_own_dimensions(&self) -> bool {
        !self.statement.group_by.is_empty()
    }
}

/// A tree node: its plan, its children and, once compiled, its selectors
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    plan: ScopePlan,
    children: Vec<BranchExecutor>,
    selectors: Option<Vec<(String, MetricSelector)>>,
}

impl Scope {
    pub(crate) fn new(plan: ScopePlan) -> Self {
        Self {
            plan,
            children: Vec::new(),
            selectors: None,
        }
    }

    pub(crate) fn plan(&self) -> &ScopePlan {
        &self.plan
    }

    pub(crate) fn children(&self) -> &[BranchExecutor] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: BranchExecutor) {
        self.children.push(child);
    }

    pub(crate) fn compile<T: ClauseTranslator + ?Sized>(
        &mut self,
        translator: &T,
    ) -> ExecutorResult<CompiledScope> {
        let compiled = compile_scope(&self.plan, &mut self.children, translator)?;
        self.selectors = Some(compiled.selectors.clone());
        Ok(compiled)
    }

    /// Decodes every seed, lets the children merge or fan out, then folds
    /// staged filter-only values into the rows
    pub(crate) fn decode_seeds<'r>(
        &self,
        seeds: Vec<(&'r Bucket, Row<'r>)>,
    ) -> ExecutorResult<Vec<Row<'r>>> {
        let selectors = self.selectors.as_deref().ok_or(ExecutorError::NotCompiled)?;
        let dimensions = self.plan.dimension_names();

        let mut rows = Vec::new();
        for (bucket, seed) in seeds {
            collect_rows(bucket, &dimensions, seed, selectors, &mut rows)?;
        }

        let mut rows = self.dispatch_to_children(rows)?;
        for row in &mut rows {
            row.flush_filtered();
        }
        Ok(rows)
    }

    fn dispatch_to_children<'r>(&self, mut rows: Vec<Row<'r>>) -> ExecutorResult<Vec<Row<'r>>> {
        let (filter_only, drill_down): (Vec<&BranchExecutor>, Vec<&BranchExecutor>) = self
            .children
            .iter()
            .partition(|child| child.is_filter_only());

        for child in filter_only {
            child.decode_filtered(&mut rows)?;
        }
        if drill_down.is_empty() {
            return Ok(rows);
        }

        let mut expanded = Vec::new();
        for child in drill_down {
            expanded.extend(child.decode_rows(&rows)?);
        }
        Ok(expanded)
    }
}
