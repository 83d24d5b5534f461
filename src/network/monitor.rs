use tokio::sync::watch;
use tracing::info;

/// Passive reachability signal shared across the networking layer.
///
/// Something platform-specific drives `set_connected`; everything else only
/// reads the current value or subscribes to transitions.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_connected: bool) -> Self {
        let (tx, _) = watch::channel(initially_connected);
        Self { tx }
    }

    /// Current reachability status.
    pub fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    /// Report a reachability change. No-op if the status did not change.
    pub fn set_connected(&self, connected: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current != connected {
                *current = connected;
                true
            } else {
                false
            }
        });

        if changed {
            info!("Connectivity changed: connected={}", connected);
        }
    }

    /// Subscribe to reachability transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
