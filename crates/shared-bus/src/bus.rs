//! # Event Bus
//!
//! Broadcast fan-out of [`SyncEvent`]s. The sync actor publishes without
//! waiting on anyone; each [`Subscription`] sees the events published after
//! it was created that pass its [`EventFilter`].

use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::events::{EventFilter, SyncEvent};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Sink for sync events.
pub trait EventPublisher: Send + Sync {
    /// Hand `event` to every current subscriber. Never blocks.
    fn publish(&self, event: SyncEvent);
}

/// In-process bus over a `tokio` broadcast channel.
///
/// A subscriber that falls more than `capacity` events behind loses the
/// oldest ones; [`Subscription::missed`] reports how many.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<SyncEvent>,
    capacity: usize,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            filter,
            missed: 0,
        }
    }

    /// Events buffered per subscriber before the oldest are dropped.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, event: SyncEvent) {
        let topic = event.topic();
        match self.sender.send(event) {
            Ok(receivers) => trace!(?topic, receivers, "Sync event published"),
            // no subscribers; an embedded client may not listen at all
            Err(_) => trace!(?topic, "Sync event dropped"),
        }
    }
}

/// Filtered view of the bus.
pub struct Subscription {
    receiver: broadcast::Receiver<SyncEvent>,
    filter: EventFilter,
    missed: u64,
}

impl Subscription {
    /// Next matching event, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<SyncEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(count)) => self.lagged(count),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Every matching event already buffered, oldest first.
    pub fn drain(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => events.push(event),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(count)) => self.lagged(count),
                Err(_) => return events,
            }
        }
    }

    /// Events lost because this subscription fell behind.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    fn lagged(&mut self, count: u64) {
        warn!(missed = count, "Sync event subscriber fell behind");
        self.missed += count;
    }
}
