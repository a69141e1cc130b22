use tokio::sync::broadcast;
use tracing::trace;

use crate::dto::sse::ServerEvent;

/// Fan-out of roster notifications to every connected SSE client.
pub struct EventHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventHub {
    /// `capacity` bounds how far a slow subscriber may lag before it starts skipping events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// New receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish `event`, returning how many subscribers received it. Nobody listening is fine.
    pub fn publish(&self, event: ServerEvent) -> usize {
        let name = event.event.clone();
        let delivered = self.sender.send(event).unwrap_or(0);
        trace!(event = ?name, delivered, "published roster event");
        delivered
    }
}
