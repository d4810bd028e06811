//! Cooperative shutdown signaling
//!
//! One controller lives at the caller boundary (main); every worker holds
//! a cheap clonable signal and checks it at its suspension points. The
//! signal never aborts a worker: workers observe it, fall through to their
//! connection-release logic, and return.

use std::time::Duration;

use tokio::sync::watch;

/// Create a linked controller/signal pair.
pub fn channel() -> (ShutdownController, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (
        ShutdownController { tx },
        ShutdownSignal {
            rx,
            _keepalive: None,
        },
    )
}

/// Caller-side handle that triggers shutdown.
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    /// Signal all workers to wind down. Idempotent.
    pub fn signal(&self) {
        let _ = self.tx.send(true);
    }
}

/// Worker-side handle for observing shutdown.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
    // Keeps the channel open for signals created without a controller.
    _keepalive: Option<std::sync::Arc<watch::Sender<bool>>>,
}

impl ShutdownSignal {
    /// A signal that never fires, for runs without a caller-side controller.
    pub fn disabled() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            rx,
            _keepalive: Some(std::sync::Arc::new(tx)),
        }
    }

    pub fn is_signaled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until shutdown is signaled.
    pub async fn wait(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // Controller dropped without signaling; treat as shutdown.
                return;
            }
        }
    }

    /// Sleep for `duration`, waking early on shutdown.
    ///
    /// Returns `true` if the full duration elapsed, `false` if interrupted.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_signaled() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.wait() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn sleep_completes_when_not_signaled() {
        let (_controller, mut signal) = channel();
        assert!(signal.sleep(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn sleep_wakes_early_on_signal() {
        let (controller, mut signal) = channel();
        let start = Instant::now();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            controller.signal();
        });
        assert!(!signal.sleep(Duration::from_secs(30)).await);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn signal_is_visible_immediately() {
        let (controller, mut signal) = channel();
        controller.signal();
        assert!(signal.is_signaled());
        assert!(!signal.sleep(Duration::from_secs(30)).await);
    }

    #[tokio::test]
    async fn disabled_signal_never_fires() {
        let mut signal = ShutdownSignal::disabled();
        assert!(!signal.is_signaled());
        assert!(signal.sleep(Duration::from_millis(5)).await);
    }
}
