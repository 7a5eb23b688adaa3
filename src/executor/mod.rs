//! Executor tree
//!
//! A chain of statements compiles into one nested aggregation request and
//! decodes back into flat rows.
//!
//! # Tree shape
//!
//! The leaf is bound to a physical index and is the root of the tree. Each
//! `WITH SELECT ... AS alias` statement that reads from an earlier alias is a
//! branch nested under that alias's executor.
//!
//! # Flow
//!
//! 1. Compile top-down: every scope emits its grouping levels and splices
//!    its children's fragments under its innermost level
//! 2. Dispatch once, at the leaf
//! 3. Decode bottom-up through the bucket tree: each scope decodes its own
//!    levels, then filter-only children stage values on the same rows and
//!    drill-down children replace them with their fan-out
//!
//! # Invariants
//!
//! - ORDER BY / LIMIT need exactly one grouping level in their scope,
//!   counting a branch's WHERE filter level
//! - Rows keep backend bucket order; nothing is re-sorted
//! - Decode-time state never reaches the result set

mod branch;
mod compiler;
mod decoder;
mod errors;
mod leaf;
mod result;
mod row;
mod scope;

pub use branch::BranchExecutor;
pub use compiler::{CompiledScope, SINGLE_GROUP_BY};
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use leaf::LeafExecutor;
pub use result::ResultSet;
pub use row::Row;
pub use scope::{ScopePlan, UNNAMED_FILTER};
