//! Operator interrupt propagation

use tokio::sync::watch;
use tracing::debug;

/// Create a linked trigger/listener pair
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// Sending half, owned by the signal handler
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        debug!("ShutdownTrigger::trigger: called");
        // No listeners left means nothing to stop
        let _ = self.tx.send(true);
    }
}

/// Listening half, cloned into anything that waits
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// A listener that never fires
    pub fn never() -> Self {
        let (_, shutdown) = channel();
        shutdown
    }

    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been requested
    ///
    /// If the trigger is dropped without firing, this never resolves.
    pub async fn requested(&mut self) {
        if self.rx.wait_for(|stop| *stop).await.is_err() {
            debug!("Shutdown::requested: trigger dropped");
            std::future::pending::<()>().await;
        }
    }
}
