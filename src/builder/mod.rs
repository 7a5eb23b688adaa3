//! Tree builder
//!
//! Turns an ordered statement program into a leaf-rooted executor tree. The
//! first statement reads a physical index and becomes the leaf; every later
//! statement must read an alias declared before it and is nested under that
//! alias's executor, in program order.

mod errors;

pub use errors::{BuildError, BuildResult};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::executor::{BranchExecutor, LeafExecutor};
use crate::statement::Statement;

/// One `[WITH] SELECT ... [AS alias]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramStatement {
    pub statement: Statement,
    #[serde(default)]
    pub alias: Option<String>,
}

impl ProgramStatement {
    pub fn new(statement: Statement) -> Self {
        Self {
            statement,
            alias: None,
        }
    }

    pub fn aliased(statement: Statement, alias: impl Into<String>) -> Self {
        Self {
            statement,
            alias: Some(alias.into()),
        }
    }
}

/// An ordered chain of statements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<ProgramStatement>,
}

impl Program {
    pub fn new(statements: Vec<ProgramStatement>) -> Self {
        Self { statements }
    }
}

pub struct TreeBuilder;

impl TreeBuilder {
    pub fn build(program: Program) -> BuildResult<LeafExecutor> {
        let parents = Self::resolve(&program)?;

        let mut statements = program.statements.into_iter();
        let leaf_entry = statements.next().ok_or(BuildError::EmptyProgram)?;

        let mut pending: Vec<Vec<BranchExecutor>> = (0..parents.len()).map(|_| Vec::new()).collect();
        let branches: Vec<(usize, ProgramStatement)> =
            statements.enumerate().map(|(offset, entry)| (offset + 1, entry)).collect();

        // children always come after their parent, so build back to front
        for (index, entry) in branches.into_iter().rev() {
            let mut branch = BranchExecutor::new(entry.statement, entry.alias);
            for child in std::mem::take(&mut pending[index]).into_iter().rev() {
                branch.add_child(child);
            }
            pending[parents[index]].push(branch);
        }

        let mut leaf = LeafExecutor::new(leaf_entry.statement);
        for child in std::mem::take(&mut pending[0]).into_iter().rev() {
            leaf.add_child(child);
        }
        Ok(leaf)
    }

    /// Parent index of every statement; the leaf is its own parent
    fn resolve(program: &Program) -> BuildResult<Vec<usize>> {
        if program.statements.is_empty() {
            return Err(BuildError::EmptyProgram);
        }

        let mut declared: HashMap<&str, usize> = HashMap::new();
        let mut parents = Vec::with_capacity(program.statements.len());
        for (index, entry) in program.statements.iter().enumerate() {
            let source = entry.statement.source.as_str();
            match declared.get(source) {
                Some(&parent) => parents.push(parent),
                None if index == 0 => parents.push(0),
                None => {
                    let declared_later = program
                        .statements
                        .iter()
                        .skip(index)
                        .any(|later| later.alias.as_deref() == Some(source));
                    if declared_later {
                        return Err(BuildError::ForwardReference(source.to_string()));
                    }
                    return Err(BuildError::MultipleSources {
                        first: program.statements[0].statement.source.clone(),
                        second: source.to_string(),
                    });
                }
            }

            if let Some(alias) = entry.alias.as_deref() {
                if declared.insert(alias, index).is_some() {
                    return Err(BuildError::DuplicateAlias(alias.to_string()));
                }
            }
        }
        Ok(parents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Expr;

    fn select(source: &str) -> Statement {
        Statement::from_source(source).select(Expr::Wildcard)
    }

    #[test]
    fn test_chain_nests_in_order() {
        let program = Program::new(vec![
            ProgramStatement::aliased(select("symbol"), "all_symbols"),
            ProgramStatement::aliased(select("all_symbols"), "finance_symbols"),
            ProgramStatement::new(select("finance_symbols")),
            ProgramStatement::aliased(select("all_symbols"), "tech_symbols"),
        ]);
        let leaf = TreeBuilder::build(program).unwrap();

        assert_eq!(leaf.source(), "symbol");
        let children: Vec<_> = leaf.children().iter().map(|c| c.alias()).collect();
        assert_eq!(children, vec![Some("finance_symbols"), Some("tech_symbols")]);
        assert_eq!(leaf.children()[0].children().len(), 1);
        assert_eq!(leaf.children()[0].children()[0].alias(), None);
        assert!(leaf.children()[1].children().is_empty());
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(
            TreeBuilder::build(Program::default()).unwrap_err(),
            BuildError::EmptyProgram
        );
    }

    #[test]
    fn test_duplicate_alias() {
        let program = Program::new(vec![
            ProgramStatement::aliased(select("symbol"), "a"),
            ProgramStatement::aliased(select("a"), "a"),
        ]);
        assert_eq!(
            TreeBuilder::build(program).unwrap_err(),
            BuildError::DuplicateAlias("a".into())
        );
    }

    #[test]
    fn test_second_physical_source() {
        let program = Program::new(vec![
            ProgramStatement::aliased(select("symbol"), "a"),
            ProgramStatement::new(select("quote")),
        ]);
        assert_eq!(
            TreeBuilder::build(program).unwrap_err(),
            BuildError::MultipleSources {
                first: "symbol".into(),
                second: "quote".into()
            }
        );
    }

    #[test]
    fn test_forward_reference() {
        let program = Program::new(vec![
            ProgramStatement::new(select("symbol")),
            ProgramStatement::new(select("later")),
            ProgramStatement::aliased(select("symbol"), "later"),
        ]);
        assert_eq!(
            TreeBuilder::build(program).unwrap_err(),
            BuildError::ForwardReference("later".into())
        );
    }

    #[test]
    fn test_program_from_json() {
        let program: Program = serde_json::from_value(serde_json::json!({
            "statements": [
                {"statement": {"source": "symbol", "projections": [{"expr": "wildcard"}]}, "alias": "s"},
                {"statement": {"source": "s", "group_by": [{"name": "ipo_year", "expr": {"column": "ipo_year"}}]}}
            ]
        }))
        .unwrap();
        let leaf = TreeBuilder::build(program).unwrap();
        assert_eq!(leaf.children().len(), 1);
        assert!(!leaf.children()[0].is_filter_only());
    }
}
