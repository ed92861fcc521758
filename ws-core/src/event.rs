//! In-process publish/subscribe bus
//!
//! One [`EventService`] exists per event type. Subscribers are called on the
//! publisher's thread, so they must be cheap and must not block. Every
//! subscription is represented by a [`Subscription`] guard that removes the
//! subscriber when dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::trace;

pub trait EventSubscriber<E>: Send + Sync {
    fn on_event(&self, event: &E);
}

pub struct EventService<E> {
    subscribers: RwLock<HashMap<u64, Arc<dyn EventSubscriber<E>>>>,
    next_id: AtomicU64,
}

impl<E: 'static> EventService<E> {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a subscriber. It stays registered until the returned guard is dropped.
    pub fn subscribe(self: &Arc<Self>, subscriber: Arc<dyn EventSubscriber<E>>) -> Subscription<E> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, subscriber);

        Subscription {
            service: Arc::clone(self),
            id,
        }
    }

    /// Returns false when no subscriber with this id was registered.
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn publish(&self, event: &E) {
        // Snapshot first: a subscriber may drop its own subscription while being notified.
        let subscribers: Vec<_> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for subscriber in subscribers {
            subscriber.on_event(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<E: 'static> Default for EventService<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventService<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .subscribers
            .read()
            .map(|subscribers| subscribers.len())
            .unwrap_or_default();
        f.debug_struct("EventService")
            .field("subscribers", &count)
            .finish()
    }
}

/// Keeps a subscriber registered for as long as it is alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription<E: 'static> {
    service: Arc<EventService<E>>,
    id: u64,
}

impl<E: 'static> Drop for Subscription<E> {
    fn drop(&mut self) {
        self.service.unsubscribe(self.id);
    }
}

impl<E: 'static> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Forwards events into an unbounded channel so async code can consume them.
pub struct ChannelSubscriber<E> {
    sender: mpsc::UnboundedSender<E>,
}

impl<E: Clone + Send + 'static> ChannelSubscriber<E> {
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<E>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender }), receiver)
    }
}

impl<E: Clone + Send + 'static> EventSubscriber<E> for ChannelSubscriber<E> {
    fn on_event(&self, event: &E) {
        if self.sender.send(event.clone()).is_err() {
            trace!("Dropping event, receiver is gone");
        }
    }
}
