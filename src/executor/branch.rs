//! Branch executor: a `WITH SELECT ... AS alias` scope nested under its
//! source

use crate::statement::Statement;
use crate::translator::ClauseTranslator;

use super::compiler::CompiledScope;
use super::errors::ExecutorResult;
use super::row::Row;
use super::scope::{Scope, ScopePlan};

#[derive(Debug, Clone)]
pub struct BranchExecutor {
    alias: Option<String>,
    scope: Scope,
}

impl BranchExecutor {
    pub fn new(statement: Statement, alias: Option<String>) -> Self {
        let plan = ScopePlan::branch(statement, alias.as_deref());
        Self {
            alias,
            scope: Scope::new(plan),
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn plan(&self) -> &ScopePlan {
        self.scope.plan()
    }

    pub fn children(&self) -> &[BranchExecutor] {
        self.scope.children()
    }

    pub fn add_child(&mut self, child: BranchExecutor) {
        self.scope.add_child(child);
    }

    /// A branch is filter-only when it adds no GROUP BY of its own and all
    /// of its children are filter-only: its values merge into the parent's
    /// rows instead of producing new ones.
    pub fn is_filter_only(&self) -> bool {
        !self.scope.plan().has_own_dimensions()
            && self.scope.children().iter().all(BranchExecutor::is_filter_only)
    }

    pub(crate) fn compile<T: ClauseTranslator + ?Sized>(
        &mut self,
        translator: &T,
    ) -> ExecutorResult<CompiledScope> {
        self.scope.compile(translator)
    }

    /// Filter-only decode: stages this scope's values on each parent row
    pub(crate) fn decode_filtered<'r>(&self, rows: &mut [Row<'r>]) -> ExecutorResult<()> {
        for row in rows.iter_mut() {
            let bucket = match row.bucket {
                Some(bucket) => bucket,
                None => continue,
            };
            let mut seed = Row::seed(bucket);
            seed.scope_path = row.descend(self.alias()).scope_path;
            for decoded in self.scope.decode_seeds(vec![(bucket, seed)])? {
                row.filtered.extend(decoded.values);
            }
        }
        Ok(())
    }

    /// Drill-down decode: each parent row fans out into this scope's rows
    pub(crate) fn decode_rows<'r>(&self, rows: &[Row<'r>]) -> ExecutorResult<Vec<Row<'r>>> {
        let seeds = rows
            .iter()
            .filter_map(|row| row.bucket.map(|bucket| (bucket, row.descend(self.alias()))))
            .collect();
        self.scope.decode_seeds(seeds)
    }
}
