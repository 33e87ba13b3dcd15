//! Lifecycle event notifications.
//!
//! # Responsibilities
//! - Define the zero-payload lifecycle event markers
//! - Deliver events to registered subscribers, fire-and-forget
//! - Log (never propagate) subscriber delivery failures
//!
//! # Design Decisions
//! - Subscribers are injected trait objects, no process-wide registry
//! - Delivery order follows subscription order
//! - A failing subscriber never blocks delivery to later subscribers

use std::sync::{Arc, RwLock};

/// Boxed error returned by a subscriber that failed to consume an event.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

/// Zero-payload lifecycle notifications published by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    /// The transport went live and the server is accepting work.
    Initialized,
    /// A shutdown request was accepted and the drain is beginning.
    ShutdownInitiated,
    /// The drain finished (cleanly or forced) and the transport is closed.
    ShutdownCompleted,
}

/// Consumer of lifecycle notifications.
///
/// Delivery is fire-and-forget: a returned error is logged by the bus and
/// has no effect on the lifecycle transition in progress.
pub trait EventSubscriber: Send + Sync {
    fn on_event(&self, event: ServerEvent) -> Result<(), SubscriberError>;
}

/// Fan-out channel delivering lifecycle events to zero or more subscribers.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Subscribers registered after an event was
    /// published do not see past events.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers
            .write()
            .expect("subscriber list poisoned")
            .push(subscriber);
    }

    /// Publish an event to every subscriber in subscription order.
    ///
    /// Failures are logged at warn level and delivery continues with the
    /// next subscriber.
    pub fn publish(&self, event: ServerEvent) {
        let subscribers = self
            .subscribers
            .read()
            .expect("subscriber list poisoned")
            .clone();
        for subscriber in &subscribers {
            if let Err(error) = subscriber.on_event(event) {
                tracing::warn!(?event, %error, "event subscriber failed, continuing");
            }
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .expect("subscriber list poisoned")
            .len()
    }
}
