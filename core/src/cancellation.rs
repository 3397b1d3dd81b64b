//! Cooperative cancellation shared across a run's fan-out tasks.
//!
//! A single in-flight future can be cancelled with `tokio::task::AbortHandle`,
//! but a run here spawns many concurrent target/judge/on-topic calls at
//! once, so cancellation has to reach all of them through one shared flag
//! rather than one handle per task.

use tokio::sync::watch;

/// A cheap-to-clone handle that lets any task observe "stop now".
///
/// Checked at depth boundaries between rounds and inside generator
/// implementations that can observe it mid-call; nothing forcibly aborts a
/// task that doesn't check.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: watch::Sender<bool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel()` has been called. Safe to await from multiple
    /// clones concurrently.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if *rx.borrow() {
            return;
        }
        let _ = rx.changed().await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
