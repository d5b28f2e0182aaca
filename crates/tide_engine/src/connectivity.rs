use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tide_logging::{tide_debug, tide_info};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// Answers "is the network usable right now?".
#[async_trait::async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self) -> bool;
}

/// Considers the network available when a TCP connection to `addr` opens
/// within `timeout`.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn probe(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(self.addr.as_str())).await,
            Ok(Ok(_))
        )
    }
}

/// Collapses a series of observations into availability changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectivityTracker {
    last: Option<bool>,
}

impl ConnectivityTracker {
    /// Returns the observation if it differs from the previous one; the
    /// first observation is always reported.
    pub fn observe(&mut self, available: bool) -> Option<bool> {
        if self.last == Some(available) {
            return None;
        }
        self.last = Some(available);
        Some(available)
    }
}

/// Polls a probe on a background thread and reports availability changes.
/// Polling stops when the monitor is dropped.
pub struct ConnectivityMonitor {
    cancel: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl ConnectivityMonitor {
    pub fn spawn<P, F>(probe: P, interval: Duration, on_change: F) -> io::Result<Self>
    where
        P: ConnectivityProbe + 'static,
        F: Fn(bool) + Send + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        let thread = thread::Builder::new()
            .name("tide-connectivity".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let mut tracker = ConnectivityTracker::default();
                    loop {
                        let available = tokio::select! {
                            _ = stop.cancelled() => break,
                            available = probe.probe() => available,
                        };
                        if let Some(changed) = tracker.observe(available) {
                            tide_info!("Connectivity available={}", changed);
                            on_change(changed);
                        }
                        tokio::select! {
                            _ = stop.cancelled() => break,
                            _ = tokio::time::sleep(interval) => {}
                        }
                    }
                    tide_debug!("Connectivity monitor stopped");
                });
            })?;

        Ok(Self {
            cancel,
            thread: Some(thread),
        })
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
