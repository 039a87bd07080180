//! In-memory diagnostic log for gateway traffic.
//!
//! Every invocation and its outcome is recorded for later inspection. The
//! log is bounded only by process lifetime and must never block or fail the
//! primary call.

use std::sync::Mutex;

use crate::domain::foundation::Timestamp;

/// What a diagnostic entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Request,
    Response,
    Error,
}

/// One recorded gateway event.
#[derive(Debug, Clone)]
pub struct DiagnosticEntry {
    pub timestamp: Timestamp,
    pub kind: DiagnosticKind,
    pub detail: String,
}

/// Append-only log shared between the gateway and its inspectors.
#[derive(Debug, Default)]
pub struct DiagnosticsLog {
    entries: Mutex<Vec<DiagnosticEntry>>,
}

impl DiagnosticsLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event. A poisoned lock drops the entry rather than
    /// propagating a panic into the call path.
    pub fn record(&self, kind: DiagnosticKind, detail: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(DiagnosticEntry {
                timestamp: Timestamp::now(),
                kind,
                detail: detail.into(),
            });
        }
    }

    /// A copy of every recorded entry, oldest first.
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
