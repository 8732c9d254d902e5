//! Event bus owned by an editor session.
//!
//! Synchronous handlers run on the publishing call; a broadcast channel
//! serves consumers that drain events later (the CLI progress output).

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EventCategory, SceneEvent};

/// Events buffered per broadcast receiver before it lags
pub const CHANNEL_CAPACITY: usize = 256;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0.simple())
    }
}

/// Which events a handler receives
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &SceneEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(wanted) => wanted.contains(&event.category()),
        }
    }
}

type Handler = Box<dyn Fn(SceneEvent) + Send + Sync>;

/// Publish/subscribe hub for scene events
pub struct EventBus {
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, Handler)>>,
    sender: broadcast::Sender<SceneEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            handlers: RwLock::new(HashMap::new()),
            sender,
        }
    }

    /// Deliver `event` to matching handlers and open receivers.
    ///
    /// Returns the number of deliveries; zero listeners is fine.
    pub fn publish(&self, event: SceneEvent) -> usize {
        tracing::trace!("Event: {}", event.description());

        let delivered = self
            .handlers
            .read()
            .values()
            .filter(|(filter, _)| filter.matches(&event))
            .map(|(_, handler)| handler(event.clone()))
            .count();

        delivered + self.sender.send(event).unwrap_or(0)
    }

    /// Register a handler; it runs on the publisher's thread
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(SceneEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("{} subscribed", id);
        id
    }

    /// Remove a handler; false if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.handlers.write().remove(&id).is_some()
    }

    /// Receiver of every event published from now on
    pub fn receiver(&self) -> broadcast::Receiver<SceneEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.read().len())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}
