use tokio::sync::broadcast;

use crate::types::RunEvent;

/// Default number of run events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fan-out of [`RunEvent`]s from dialog runs to observers.
///
/// Every subscriber sees every event published after it subscribed. A slow
/// subscriber that falls more than `capacity` events behind skips ahead
/// (`RecvError::Lagged`); publishing never blocks the run.
pub struct EventBus {
    tx: broadcast::Sender<RunEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a run event. Dropped when nobody is subscribed.
    pub fn publish(&self, event: RunEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
