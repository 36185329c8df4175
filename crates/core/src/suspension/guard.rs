//! Process-wide suspension latch
//!
//! Several in-flight requests can observe the same suspension at once. The
//! latch lets exactly one of them run the notify-then-logout sequence; the
//! rest just return their response.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Compare-and-swap latch over the suspension-handling sequence
#[derive(Debug, Default)]
pub struct SuspensionGuard {
    latched: AtomicBool,
    episodes: AtomicU64,
}

impl SuspensionGuard {
    /// An unlatched guard
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch if free; `false` if another sequence is already running
    #[must_use]
    pub fn try_enter(&self) -> bool {
        let entered = self
            .latched
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if entered {
            let episode = self.episodes.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(episode, "Suspension latch engaged");
        }
        entered
    }

    /// Clear the latch
    pub fn release(&self) {
        if self.latched.swap(false, Ordering::AcqRel) {
            debug!("Suspension latch released");
        }
    }

    /// Clear the latch after `delay`, leaving time for logout to settle
    #[must_use]
    pub fn release_after(self: &Arc<Self>, delay: Duration) -> JoinHandle<()> {
        let guard = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            guard.release();
        })
    }

    /// Whether a suspension is currently being handled
    #[must_use]
    pub fn is_latched(&self) -> bool {
        self.latched.load(Ordering::Acquire)
    }

    /// Number of sequences started since creation
    #[must_use]
    pub fn episodes(&self) -> u64 {
        self.episodes.load(Ordering::Acquire)
    }
}
