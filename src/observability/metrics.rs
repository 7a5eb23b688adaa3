//! Query counters
//!
//! Counters only, monotonic, reset on process start. Relaxed atomics: the
//! registry may be shared between threads running independent queries.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Requests compiled from a tree
    queries_compiled: AtomicU64,
    /// Queries that returned rows
    queries_executed: AtomicU64,
    /// Queries aborted by an error
    queries_failed: AtomicU64,
    /// Backend calls issued
    backend_dispatches: AtomicU64,
    /// Rows returned
    rows_decoded: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_compiled(&self) {
        self.queries_compiled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_backend_dispatches(&self) {
        self.backend_dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_decoded(&self, rows: u64) {
        self.rows_decoded.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_compiled: self.queries_compiled.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
            backend_dispatches: self.backend_dispatches.load(Ordering::Relaxed),
            rows_decoded: self.rows_decoded.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_compiled: u64,
    pub queries_executed: u64,
    pub queries_failed: u64,
    pub backend_dispatches: u64,
    pub rows_decoded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();
        registry.increment_queries_compiled();
        registry.increment_queries_compiled();
        registry.increment_backend_dispatches();
        registry.increment_queries_executed();
        registry.increment_queries_failed();
        registry.add_rows_decoded(7);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.queries_compiled, 2);
        assert_eq!(snapshot.backend_dispatches, 1);
        assert_eq!(snapshot.queries_executed, 1);
        assert_eq!(snapshot.queries_failed, 1);
        assert_eq!(snapshot.rows_decoded, 7);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.add_rows_decoded(12);

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["rows_decoded"], 12);
        assert_eq!(parsed["queries_failed"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_backend_dispatches();
                    reg.add_rows_decoded(2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.backend_dispatches, 800);
        assert_eq!(snapshot.rows_decoded, 1600);
    }
}
