//! Thread-safe diagnostic accumulator for parallel disassembly.

use crate::diagnostic::Diagnostic;
use std::sync::Mutex;

/// A thread-safe accumulator for diagnostics emitted during disassembly.
///
/// Any stage may emit via [`emit`](Self::emit), from any thread.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    /// Emits a diagnostic into the sink.
    pub fn emit(&self, diag: Diagnostic) {
        let mut diagnostics = self.diagnostics.lock().unwrap_or_else(|e| e.into_inner());
        diagnostics.push(diag);
    }

    /// Returns the number of diagnostics currently held.
    pub fn len(&self) -> usize {
        self.diagnostics.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns whether the sink holds no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *diagnostics)
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
