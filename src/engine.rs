//! Query engine
//!
//! Runs executor trees against one backend with one translator. Each
//! execution gets a request id and is observed phase by phase:
//!
//! - `COMPILE` tree → request
//! - `DISPATCH` the single backend call
//! - `DECODE` response → rows
//!
//! The engine adds logging and counters only; results are exactly those of
//! `LeafExecutor::execute`.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::SearchBackend;
use crate::builder::{BuildError, Program, TreeBuilder};
use crate::executor::{ExecutorError, ExecutorResult, LeafExecutor, ResultSet};
use crate::observability::{log_event, Event, MetricsRegistry, ObservationScope};
use crate::response::SearchResponse;
use crate::translator::DslTranslator;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Build(e) => e.code(),
            EngineError::Executor(e) => e.code().code(),
        }
    }
}

pub struct QueryEngine<B: SearchBackend> {
    translator: DslTranslator,
    backend: B,
    metrics: Arc<MetricsRegistry>,
}

impl<B: SearchBackend> QueryEngine<B> {
    pub fn new(translator: DslTranslator, backend: B) -> Self {
        Self {
            translator,
            backend,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Shares a registry with other engines
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub fn translator(&self) -> &DslTranslator {
        &self.translator
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Builds the executor tree of a program
    pub fn build(&self, program: Program) -> EngineResult<LeafExecutor> {
        let statements = program.statements.len().to_string();
        let leaf = TreeBuilder::build(program)?;
        log_event(
            Event::TreeBuilt,
            &[("statements", statements.as_str()), ("source", leaf.source())],
        );
        Ok(leaf)
    }

    /// Compiles a tree without dispatching; returns the request body
    pub fn compile(&self, leaf: &mut LeafExecutor) -> ExecutorResult<Value> {
        let request_id = Uuid::new_v4().to_string();
        let request = self.compile_observed(&request_id, leaf)?;
        Ok(request)
    }

    /// Compiles, dispatches and decodes
    pub fn execute(&self, leaf: &mut LeafExecutor) -> ExecutorResult<ResultSet> {
        let request_id = Uuid::new_v4().to_string();

        match self.run(&request_id, leaf) {
            Ok(rows) => {
                self.metrics.increment_queries_executed();
                self.metrics.add_rows_decoded(rows.len() as u64);
                let count = rows.len().to_string();
                log_event(
                    Event::QueryExecuted,
                    &[("request_id", request_id.as_str()), ("rows", count.as_str())],
                );
                Ok(rows)
            }
            Err(e) => {
                self.metrics.increment_queries_failed();
                let reason = e.to_string();
                log_event(
                    Event::QueryFailed,
                    &[
                        ("request_id", request_id.as_str()),
                        ("code", e.code().code()),
                        ("reason", reason.as_str()),
                    ],
                );
                Err(e)
            }
        }
    }

    /// Builds and executes a program
    pub fn execute_program(&self, program: Program) -> EngineResult<ResultSet> {
        let mut leaf = self.build(program)?;
        Ok(self.execute(&mut leaf)?)
    }

    fn run(&self, request_id: &str, leaf: &mut LeafExecutor) -> ExecutorResult<ResultSet> {
        self.compile_observed(request_id, leaf)?;
        let raw = self.dispatch(request_id, leaf)?;
        self.decode(request_id, leaf, raw)
    }

    fn compile_observed(&self, request_id: &str, leaf: &mut LeafExecutor) -> ExecutorResult<Value> {
        let scope = ObservationScope::with_fields("COMPILE", &[("request_id", request_id)]);
        match leaf.compile(&self.translator) {
            Ok(request) => {
                let body = request.to_value();
                self.metrics.increment_queries_compiled();
                scope.complete();
                log_event(
                    Event::QueryCompiled,
                    &[("request_id", request_id), ("source", leaf.source())],
                );
                Ok(body)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn dispatch(&self, request_id: &str, leaf: &LeafExecutor) -> ExecutorResult<Value> {
        let request = leaf.request().ok_or(ExecutorError::NotCompiled)?;
        let scope = ObservationScope::with_fields(
            "DISPATCH",
            &[("request_id", request_id), ("index", leaf.source())],
        );
        self.metrics.increment_backend_dispatches();
        log_event(
            Event::BackendDispatch,
            &[("request_id", request_id), ("index", leaf.source())],
        );

        match self.backend.search(leaf.source(), request) {
            Ok(raw) => {
                scope.complete();
                Ok(raw)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e.into())
            }
        }
    }

    fn decode(&self, request_id: &str, leaf: &LeafExecutor, raw: Value) -> ExecutorResult<ResultSet> {
        let scope = ObservationScope::with_fields("DECODE", &[("request_id", request_id)]);
        let decoded = SearchResponse::from_json(raw)
            .map_err(ExecutorError::from)
            .and_then(|response| leaf.decode(&response));

        match decoded {
            Ok(rows) => {
                let count = rows.len().to_string();
                scope.complete_with_fields(&[("rows", count.as_str())]);
                log_event(
                    Event::ResponseDecoded,
                    &[("request_id", request_id), ("rows", count.as_str())],
                );
                Ok(rows)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }
}
