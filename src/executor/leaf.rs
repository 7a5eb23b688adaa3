//! Leaf executor: the scope bound to a physical index
//!
//! The leaf is the root of the tree. It owns the single backend dispatch and
//! turns its WHERE clause into the request's top-level query.

use crate::backend::SearchBackend;
use crate::request::{BucketPaths, SearchRequest};
use crate::response::SearchResponse;
use crate::statement::Statement;
use crate::translator::ClauseTranslator;

use super::branch::BranchExecutor;
use super::errors::{ExecutorError, ExecutorResult};
use super::result::ResultSet;
use super::row::Row;
use super::scope::{Scope, ScopePlan};

#[derive(Debug, Clone)]
pub struct LeafExecutor {
    scope: Scope,
    request: Option<SearchRequest>,
    paths: BucketPaths,
}

impl LeafExecutor {
    pub fn new(statement: Statement) -> Self {
        Self {
            scope: Scope::new(ScopePlan::leaf(statement)),
            request: None,
            paths: BucketPaths::new(),
        }
    }

    /// Index the request is sent to
    pub fn source(&self) -> &str {
        &self.scope.plan().statement().source
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

    /// Compiles the whole tree into one request
    pub fn compile<T: ClauseTranslator + ?Sized>(
        &mut self,
        translator: &T,
    ) -> ExecutorResult<&SearchRequest> {
        let compiled = self.scope.compile(translator)?;
        let mut request = SearchRequest::aggregations(compiled.aggs);
        if let Some(filter) = self.scope.plan().query() {
            request.query = Some(translator.translate_filter(filter)?);
        }
        self.paths = compiled.paths;
        Ok(self.request.insert(request))
    }

    /// The last compiled request
    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    /// Bucket paths of every metric in the last compiled request
    pub fn bucket_paths(&self) -> &BucketPaths {
        &self.paths
    }

    /// Compiles, dispatches once and decodes
    pub fn execute<T, B>(&mut self, translator: &T, backend: &B) -> ExecutorResult<ResultSet>
    where
        T: ClauseTranslator + ?Sized,
        B: SearchBackend + ?Sized,
    {
        self.compile(translator)?;
        let request = self.request.as_ref().ok_or(ExecutorError::NotCompiled)?;
        let raw = backend.search(self.source(), request)?;
        let response = SearchResponse::from_json(raw)?;
        self.decode(&response)
    }

    /// Decodes a backend response against the compiled tree
    pub fn decode(&self, response: &SearchResponse) -> ExecutorResult<ResultSet> {
        let root = response.root_bucket();
        let rows = self.scope.decode_seeds(vec![(root, Row::seed(root))])?;
        Ok(ResultSet::from_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::statement::Expr;
    use crate::translator::DslTranslator;
    use serde_json::json;

    fn quote_leaf() -> LeafExecutor {
        LeafExecutor::new(
            Statement::from_source("quote")
                .select(Expr::column("year"))
                .select_as(Expr::call("MAX", vec![Expr::column("adj_close")]), "max_adj_close")
                .filter(Expr::eq(Expr::column("symbol"), Expr::lit("AAPL")))
                .group_by(
                    "year",
                    Expr::call("date_trunc", vec![Expr::lit("year"), Expr::column("date")]),
                ),
        )
    }

    #[test]
    fn test_where_becomes_query() {
        let mut leaf = quote_leaf();
        let request = leaf.compile(&DslTranslator::default()).unwrap();
        assert_eq!(request.query, Some(json!({"term": {"symbol": "AAPL"}})));
        assert_eq!(request.size, 0);
        assert_eq!(leaf.bucket_paths().get("max_adj_close"), Some("year.max_adj_close"));
    }

    #[test]
    fn test_execute_dispatches_once() {
        let backend = MemoryBackend::new().with_response(
            "quote",
            json!({
                "hits": {"total": 500},
                "aggregations": {"year": {"buckets": [
                    {"key_as_string": "2015", "key": 1, "doc_count": 250, "max_adj_close": {"value": 130.0}},
                    {"key_as_string": "2016", "key": 2, "doc_count": 250, "max_adj_close": {"value": 118.5}}
                ]}}
            }),
        );
        let mut leaf = quote_leaf();
        let result = leaf.execute(&DslTranslator::default(), &backend).unwrap();

        assert_eq!(
            result.to_value(),
            json!([
                {"year": "2015", "max_adj_close": 130.0},
                {"year": "2016", "max_adj_close": 118.5}
            ])
        );
        assert_eq!(backend.requests().len(), 1);
        assert_eq!(backend.requests()[0].0, "quote");
    }

    #[test]
    fn test_decode_requires_compile() {
        let leaf = quote_leaf();
        let response = SearchResponse::from_json(json!({"hits": {"total": 0}})).unwrap();
        assert_eq!(leaf.decode(&response).unwrap_err(), ExecutorError::NotCompiled);
    }
}
