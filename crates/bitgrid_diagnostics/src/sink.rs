//! Thread-safe diagnostic accumulation.

use crate::diagnostic::Diagnostic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A thread-safe collector of [`Diagnostic`]s.
///
/// Shared by reference across server connection threads; every diagnostic
/// emitted by any thread is visible to `diagnostics()`/`take_all()` on any
/// other.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Records a diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        if diagnostic.severity.is_error() {
            self.error_count.fetch_add(1, Ordering::SeqCst);
        }
        self.diagnostics
            .lock()
            .expect("diagnostic sink mutex poisoned")
            .push(diagnostic);
    }

    /// Returns `true` if at least one error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::SeqCst) > 0
    }

    /// The number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::SeqCst)
    }

    /// A snapshot copy of every diagnostic emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .expect("diagnostic sink mutex poisoned")
            .clone()
    }

    /// Drains and returns every diagnostic emitted so far, resetting the
    /// sink's error count.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        self.error_count.store(0, Ordering::SeqCst);
        std::mem::take(
            &mut *self
                .diagnostics
                .lock()
                .expect("diagnostic sink mutex poisoned"),
        )
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use std::sync::Arc;
    use std::thread;

    fn code() -> DiagnosticCode {
        DiagnosticCode::new(Category::Protocol, 1)
    }

    #[test]
    fn empty_sink_has_no_errors() {
        let sink = DiagnosticSink::new();
        assert!(!sink.has_errors());
        assert_eq!(sink.error_count(), 0);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn emit_error_increments_count() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::error(code(), "bad frame"));
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn emit_warning_does_not_count_as_error() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::warning(code(), "dropped chunk"));
        assert!(!sink.has_errors());
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn take_all_drains_and_resets() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::error(code(), "one"));
        sink.emit(Diagnostic::error(code(), "two"));
        let taken = sink.take_all();
        assert_eq!(taken.len(), 2);
        assert!(!sink.has_errors());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn concurrent_emits_are_all_recorded() {
        let sink = Arc::new(DiagnosticSink::new());
        let mut handles = Vec::new();
        for _ in 0..10 {
            let sink = Arc::clone(&sink);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    sink.emit(Diagnostic::error(code(), "concurrent"));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.error_count(), 1000);
        assert_eq!(sink.diagnostics().len(), 1000);
    }
}
