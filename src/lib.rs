//! aggtree - SQL statement chains compiled into nested search aggregations
//!
//! A chain of `WITH SELECT ... AS alias` statements becomes one executor
//! tree. The tree compiles into a single nested aggregation request, the
//! leaf dispatches it once, and the nested bucket response is decoded back
//! into flat rows.
//!
//! ```ignore
//! let mut leaf = TreeBuilder::build(program)?;
//! let engine = QueryEngine::new(DslTranslator::default(), backend);
//! let rows = engine.execute(&mut leaf)?;
//! ```

pub mod backend;
pub mod builder;
pub mod cli;
pub mod config;
pub mod engine;
pub mod executor;
pub mod observability;
pub mod request;
pub mod response;
pub mod statement;
pub mod translator;
