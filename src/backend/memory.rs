//! In-memory backend with canned responses

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::request::SearchRequest;

use super::errors::{TransportError, TransportResult};
use super::SearchBackend;

/// Returns a fixed response (or error) per index and records every request
#[derive(Debug, Default)]
pub struct MemoryBackend {
    responses: HashMap<String, TransportResult<Value>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `response` for every search against `index`
    pub fn with_response(mut self, index: impl Into<String>, response: Value) -> Self {
        self.responses.insert(index.into(), Ok(response));
        self
    }

    /// Fails every search against `index` with `error`
    pub fn with_error(mut self, index: impl Into<String>, error: TransportError) -> Self {
        self.responses.insert(index.into(), Err(error));
        self
    }

    /// (index, serialized request) pairs in dispatch order
    pub fn requests(&self) -> Vec<(String, Value)> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SearchBackend for MemoryBackend {
    fn search(&self, index: &str, request: &SearchRequest) -> TransportResult<Value> {
        self.requests
            .lock()
            .map_err(|_| TransportError::Failed("request log poisoned".into()))?
            .push((index.to_string(), request.to_value()));

        match self.responses.get(index) {
            Some(response) => response.clone(),
            None => Err(TransportError::IndexNotFound(index.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AggMap;
    use serde_json::json;

    #[test]
    fn test_canned_response_and_recording() {
        let backend = MemoryBackend::new().with_response("symbol", json!({"hits": {"total": 3}}));
        let request = SearchRequest::aggregations(AggMap::new());

        let response = backend.search("symbol", &request).unwrap();
        assert_eq!(response, json!({"hits": {"total": 3}}));
        assert_eq!(
            backend.requests(),
            vec![("symbol".to_string(), json!({"size": 0}))]
        );
    }

    #[test]
    fn test_unknown_index() {
        let backend = MemoryBackend::new();
        let request = SearchRequest::aggregations(AggMap::new());
        assert_eq!(
            backend.search("quote", &request).unwrap_err(),
            TransportError::IndexNotFound("quote".into())
        );
        assert_eq!(backend.requests().len(), 1);
    }

    #[test]
    fn test_configured_error() {
        let backend = MemoryBackend::new().with_error("quote", TransportError::Timeout(500));
        let request = SearchRequest::aggregations(AggMap::new());
        let err = backend.search("quote", &request).unwrap_err();
        assert_eq!(err, TransportError::Timeout(500));
        assert_eq!(err.code(), "AGG_TRANSPORT_FAILED");
    }
}
