//! Advisory online/offline signal.
//!
//! The flag is a hint for logging and optional fast-fail. Actual request
//! failures remain the ground truth; nothing relies on the flag being
//! accurate.

use crate::config::ReachabilityConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

/// Shared reachability flag, published over a watch channel.
///
/// Clones observe the same flag. Readers tolerate staleness.
#[derive(Clone, Debug)]
pub struct ReachabilityMonitor {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ReachabilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReachabilityMonitor {
    /// Starts optimistic: online until told otherwise.
    pub fn new() -> Self {
        Self::with_initial(true)
    }

    pub fn with_initial(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Applies a connectivity change. Returns true if the flag flipped;
    /// repeated events for the current state are ignored.
    pub fn notify(&self, event: ConnectivityEvent) -> bool {
        let online = event == ConnectivityEvent::Online;
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed {
            info!("network reachability changed: {}", if online { "online" } else { "offline" });
        }
        changed
    }

    /// Spawns a background task that periodically opens a TCP connection to
    /// `config.probe_addr` and publishes the outcome.
    ///
    /// Must be called inside a tokio runtime. The task stops when the
    /// returned handle is dropped.
    pub fn spawn_probe(&self, config: ReachabilityConfig) -> ProbeHandle {
        let monitor = self.clone();
        let interval = Duration::from_secs(config.probe_interval_secs.max(1));
        let timeout = Duration::from_secs(config.probe_timeout_secs.max(1));

        let task = tokio::spawn(async move {
            loop {
                let event = if probe(&config.probe_addr, timeout).await {
                    ConnectivityEvent::Online
                } else {
                    ConnectivityEvent::Offline
                };
                monitor.notify(event);
                tokio::time::sleep(interval).await;
            }
        });
        ProbeHandle { task }
    }
}

async fn probe(addr: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!("reachability probe to {addr} failed: {e}");
            false
        }
        Err(_) => {
            debug!("reachability probe to {addr} timed out after {timeout:?}");
            false
        }
    }
}

/// Owns the probe task; aborts it on drop.
#[derive(Debug)]
pub struct ProbeHandle {
    task: JoinHandle<()>,
}

impl ProbeHandle {
    /// Stops the probe now rather than at end of scope.
    pub fn stop(self) {}
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
