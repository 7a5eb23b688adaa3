//! Search backend dispatch
//!
//! The leaf executor issues exactly one `search` call per execution. Network
//! transports implement `SearchBackend`; `MemoryBackend` serves canned
//! responses for tests and for decoding saved responses offline.

mod errors;
mod memory;

pub use errors::{TransportError, TransportResult};
pub use memory::MemoryBackend;

use serde_json::Value;

use crate::request::SearchRequest;

/// Sends a compiled request to an index and returns the raw response
pub trait SearchBackend {
    /// The response must carry `hits.total` and may carry `aggregations`
    fn search(&self, index: &str, request: &SearchRequest) -> TransportResult<Value>;
}

impl<B: SearchBackend + ?Sized> SearchBackend for &B {
    fn search(&self, index: &str, request: &SearchRequest) -> TransportResult<Value> {
        (**self).search(index, request)
    }
}
