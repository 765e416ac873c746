//! A cloneable handle for poking a session from external code.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

/// A cloneable handle for observing and cancelling a session's in-flight
/// invocation.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) cancel: Arc<Mutex<CancellationToken>>,
    pub(crate) idle_notify: Arc<tokio::sync::Notify>,
    pub(crate) is_running: Arc<AtomicBool>,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            idle_notify: Arc::new(tokio::sync::Notify::new()),
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Abort the current invocation. The in-flight turn is discarded; AI
    /// state stays at its last committed turn.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Get the current cancellation token
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.lock().clone()
    }

    /// Whether an invocation is currently running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// Wait until the session becomes idle
    pub async fn wait_for_idle(&self) {
        let notified = self.idle_notify.notified();
        if !self.is_running.load(Ordering::Acquire) {
            return;
        }
        notified.await;
    }

    /// Wait until the session becomes idle, with a timeout.
    /// Returns `true` if idle was reached, `false` on timeout.
    pub async fn wait_for_idle_timeout(&self, timeout: std::time::Duration) -> bool {
        if !self.is_running.load(Ordering::Acquire) {
            return true;
        }
        tokio::time::timeout(timeout, self.wait_for_idle())
            .await
            .is_ok()
    }
}
