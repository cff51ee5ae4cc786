//! Report handler for resolution problems found while indexing.
//!
//! The indexer runs in one of two strictness modes. In `Strict` mode any
//! reported problem is returned to the caller and aborts the current
//! package. In `Lenient` mode problems are logged, recorded, and
//! swallowed; the caller skips the offending identifier and the document
//! degrades (missing occurrences) without ever being corrupted.
//!
//! Call sites treat both outcomes the same way: report, then skip.

use std::sync::Mutex;

// ============================================================================
// Strictness
// ============================================================================

/// How reported problems are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Return every reported problem to the caller.
    Strict,
    /// Log, record, and continue.
    #[default]
    Lenient,
}

// ============================================================================
// Handler
// ============================================================================

/// Sink for non-fatal resolution problems.
///
/// Shared by every file visitor of a run; recording is synchronized so
/// independent package workers can report concurrently.
#[derive(Debug, Default)]
pub struct Handler {
    strictness: Strictness,
    recorded: Mutex<Vec<String>>,
}

impl Handler {
    pub fn new(strictness: Strictness) -> Self {
        Handler {
            strictness,
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn strict() -> Self {
        Handler::new(Strictness::Strict)
    }

    pub fn lenient() -> Self {
        Handler::new(Strictness::Lenient)
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Report a problem. Strict mode hands it back to the caller; lenient
    /// mode logs and records it. Either way the call site must skip the
    /// identifier it was processing.
    pub fn report<E: std::error::Error>(&self, err: E) -> Result<(), E> {
        match self.strictness {
            Strictness::Strict => Err(err),
            Strictness::Lenient => {
                tracing::warn!(error = %err, "skipping unresolved occurrence");
                self.recorded
                    .lock()
                    .expect("handler record lock poisoned")
                    .push(err.to_string());
                Ok(())
            }
        }
    }

    /// Messages recorded so far (lenient mode only).
    pub fn recorded(&self) -> Vec<String> {
        self.recorded
            .lock()
            .expect("handler record lock poisoned")
            .clone()
    }
}
