//! Cooperative cancellation
//!
//! A [`CancellationToken`] is created by the caller (or defaulted to a
//! token that never fires) and threaded through every asynchronous step
//! of an execution. The executor observes it while I/O is outstanding;
//! pure-CPU phases (translation, materialization) never check it.

use std::sync::Arc;

use tokio::sync::watch;

/// Cooperative cancellation signal
///
/// Clones share the same underlying signal: cancelling any clone
/// cancels them all. Cancellation is sticky: once fired it never
/// resets.
#[derive(Clone)]
pub struct CancellationToken {
    signal: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Create a fresh, uncancelled token
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            signal: Arc::new(tx),
        }
    }

    /// A token that is never cancelled
    ///
    /// The no-op default for call sites that do not need cancellation.
    pub fn none() -> Self {
        Self::new()
    }

    /// Fire the cancellation signal
    pub fn cancel(&self) {
        self.signal.send_replace(true);
    }

    /// Returns true if the token has been cancelled
    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Resolves when the token is cancelled
    ///
    /// Pends forever on a token that is never cancelled, so callers
    /// must race it against useful work (`tokio::select!`), never await
    /// it alone.
    pub async fn cancelled(&self) {
        let mut rx = self.signal.subscribe();
        if *rx.borrow() {
            return;
        }
        // The sender lives in self, so changed() cannot error while we
        // hold a clone of the Arc.
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
