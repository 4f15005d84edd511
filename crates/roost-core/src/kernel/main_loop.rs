use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Run-until-stopped primitive for the component's cooperative loop.
///
/// `stop` is idempotent: stopping an already-stopped loop is a no-op. A stop
/// issued before anyone waits is not lost; the stored permit wakes the next
/// waiter immediately.
#[derive(Debug, Clone, Default)]
pub struct MainLoop {
    shutdown: Arc<Notify>,
    stopped: Arc<AtomicBool>,
}

impl MainLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to exit.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Resolves once `stop` has been called; immediately if it already was.
    pub async fn wait_stopped(&self) {
        if self.is_stopped() {
            return;
        }
        self.shutdown.notified().await;
    }
}
