//! ObservationScope for automatic begin/complete logging
//!
//! - `{name}_BEGIN` on creation (TRACE)
//! - `{name}_COMPLETE` with `elapsed_ms` on `complete()` (INFO)
//! - `{name}_FAILED` on `fail()` (ERROR)
//! - `{name}_INCOMPLETE` if dropped without either (WARN)

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs its own begin and end
///
/// ```ignore
/// let scope = ObservationScope::with_fields("COMPILE", &[("request_id", &id)]);
/// let request = leaf.compile(&translator)?;
/// scope.complete();
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    timer: Timer,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Fields are repeated on every line the scope logs
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::trace(&format!("{}_BEGIN", name), fields);

        Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        }
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.timer.elapsed_ms();

        let mut all_fields = self.field_refs();
        all_fields.push(("elapsed_ms", elapsed.as_str()));
        all_fields.extend(extra_fields.iter().copied());

        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    pub fn fail(self, reason: &str) {
        self.completed.set(true);
        let mut all_fields = self.field_refs();
        all_fields.push(("reason", reason));
        Logger::error(&format!("{}_FAILED", self.name), &all_fields);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            let mut fields = self.field_refs();
            fields.push(("reason", "scope dropped without completion"));
            Logger::warn(&format!("{}_INCOMPLETE", self.name), &fields);
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_complete() {
        let scope = ObservationScope::new("COMPILE");
        assert!(!scope.is_completed());
        scope.complete();
    }

    #[test]
    fn test_scope_with_fields() {
        let scope = ObservationScope::with_fields("DISPATCH", &[("index", "quote")]);
        scope.complete_with_fields(&[("rows", "3")]);
    }

    #[test]
    fn test_scope_fail() {
        let scope = ObservationScope::new("DECODE");
        scope.fail("response is missing hits.total");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope = ObservationScope::new("DECODE");
        drop(scope);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let ms: u64 = timer.elapsed_ms().parse().unwrap();
        assert!(ms >= 5);
    }
}
