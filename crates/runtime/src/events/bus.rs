//! Synchronous observer registry with an optional async stream.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use super::types::{BattleEvent, EventKind, Topic};

/// Callback invoked for each matching event.
pub type EventHandler = Arc<dyn Fn(&BattleEvent) + Send + Sync>;

/// Handle returned by the subscribe methods; pass it to
/// [`EventBus::unsubscribe`] to detach the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Kind(EventKind),
    Topic(Topic),
    All,
}

impl Filter {
    fn matches(&self, event: &BattleEvent) -> bool {
        match self {
            Filter::Kind(kind) => *kind == event.kind(),
            Filter::Topic(topic) => *topic == event.topic(),
            Filter::All => true,
        }
    }
}

struct Subscription {
    id: SubscriptionId,
    filter: Filter,
    handler: EventHandler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Event bus shared by the orchestrator and its collaborators.
///
/// Handlers run synchronously on the publishing thread, in subscription order.
/// The registry lock is released before handlers run, so a handler may
/// subscribe or unsubscribe without deadlocking; such changes take effect from
/// the next publish.
///
/// Async consumers can additionally take a broadcast receiver with
/// [`EventBus::stream`]. Stream delivery is best-effort.
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
    stream: broadcast::Sender<BattleEvent>,
}

impl EventBus {
    /// Creates a new event bus with default stream capacity
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with the given stream capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            stream: broadcast::channel(capacity.max(1)).0,
        }
    }

    /// Subscribe a handler to one event kind.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&BattleEvent) + Send + Sync + 'static,
    {
        self.insert(Filter::Kind(kind), Arc::new(handler))
    }

    /// Subscribe a handler to every event of a topic.
    pub fn subscribe_topic<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&BattleEvent) + Send + Sync + 'static,
    {
        self.insert(Filter::Topic(topic), Arc::new(handler))
    }

    /// Subscribe a handler to all events.
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&BattleEvent) + Send + Sync + 'static,
    {
        self.insert(Filter::All, Arc::new(handler))
    }

    /// Detach a handler. Returns false if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.lock();
        let before = registry.subscriptions.len();
        registry.subscriptions.retain(|s| s.id != id);
        registry.subscriptions.len() < before
    }

    /// Detach every handler.
    pub fn clear(&self) {
        self.lock().subscriptions.clear();
    }

    /// Number of attached handlers.
    pub fn handler_count(&self) -> usize {
        self.lock().subscriptions.len()
    }

    /// Receiver for async consumers.
    pub fn stream(&self) -> broadcast::Receiver<BattleEvent> {
        self.stream.subscribe()
    }

    /// Deliver an event to every matching handler, then to the stream.
    pub fn publish(&self, event: BattleEvent) {
        let handlers: Vec<EventHandler> = self
            .lock()
            .subscriptions
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| Arc::clone(&s.handler))
            .collect();

        tracing::trace!(
            target: "battle::events",
            event = event.name(),
            handlers = handlers.len(),
            "publishing"
        );

        for handler in &handlers {
            handler(&event);
        }

        if self.stream.send(event).is_err() {
            // No stream receivers - this is normal, not an error
        }
    }

    fn insert(&self, filter: Filter, handler: EventHandler) -> SubscriptionId {
        let mut registry = self.lock();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry.subscriptions.push(Subscription {
            id,
            filter,
            handler,
        });
        id
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            stream: self.stream.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::UnitId;

    fn recorder(bus: &EventBus) -> (Arc<Mutex<Vec<String>>>, SubscriptionId) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = bus.subscribe_all(move |e| sink.lock().unwrap().push(e.name().to_string()));
        (seen, id)
    }

    #[test]
    fn handlers_receive_matching_kinds_only() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        bus.subscribe(EventKind::SystemReset, move |_| *counter.lock().unwrap() += 1);

        bus.publish(BattleEvent::SystemReset);
        bus.publish(BattleEvent::AttackCancelled { attacker: None });

        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn delivery_is_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe_topic(Topic::System, move |_| order.lock().unwrap().push(tag));
        }

        bus.publish(BattleEvent::SystemReset);

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let (seen, id) = recorder(&bus);

        bus.publish(BattleEvent::SystemReset);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(BattleEvent::SystemReset);

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(bus.handler_count(), 0);
    }

    #[test]
    fn handler_may_subscribe_during_dispatch() {
        let bus = EventBus::new();
        let inner = bus.clone();
        bus.subscribe(EventKind::SystemReset, move |_| {
            inner.subscribe_all(|_| {});
        });

        bus.publish(BattleEvent::SystemReset);

        assert_eq!(bus.handler_count(), 2);
    }

    #[tokio::test]
    async fn stream_receives_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.stream();

        bus.publish(BattleEvent::TargetSelected {
            attacker: UnitId(1),
            target: UnitId(2),
        });

        let event = rx.recv().await.expect("event on stream");
        assert_eq!(event.kind(), EventKind::TargetSelected);
        assert_eq!(event.name(), "target-selected");
    }
}
