use tide_core::LoadStatus;
use tokio::sync::watch;

/// Latest-value broadcast of the reactor's status.
///
/// Only the reactor thread publishes. Subscribers never see history, only
/// the most recent status, and a fresh subscription starts from it.
#[derive(Debug)]
pub struct StatusPublisher {
    tx: watch::Sender<LoadStatus>,
}

impl StatusPublisher {
    pub fn new(initial: LoadStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Equal values are swallowed without waking subscribers.
    pub(crate) fn publish(&self, status: LoadStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    pub fn current(&self) -> LoadStatus {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> StatusSubscription {
        StatusSubscription {
            rx: self.tx.subscribe(),
            primed: false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One observer's view of the published status.
#[derive(Debug, Clone)]
pub struct StatusSubscription {
    rx: watch::Receiver<LoadStatus>,
    primed: bool,
}

impl StatusSubscription {
    pub fn current(&self) -> LoadStatus {
        self.rx.borrow().clone()
    }

    /// The first call yields the status current at subscription time; later
    /// calls wait for the next change. `None` once the publisher is gone.
    pub async fn recv(&mut self) -> Option<LoadStatus> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until the status satisfies `predicate`, checking the current
    /// value first.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&LoadStatus) -> bool,
    ) -> Option<LoadStatus> {
        self.primed = true;
        let status = self.rx.wait_for(|status| predicate(status)).await.ok()?;
        Some((*status).clone())
    }
}
