//! Change notification bus
//!
//! An in-process publish/subscribe registry. Observers hold a
//! [`Subscription`] and stop receiving as soon as it is dropped. Notifications
//! carry no payload; receivers re-read whatever state they display.

use lyra_core::PreferenceKind;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::mpsc;

/// Named change signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    FavoritesUpdated,
    DislikesUpdated,
}

impl Notification {
    /// Signal announcing a change to the `kind` set
    pub fn for_kind(kind: PreferenceKind) -> Self {
        match kind {
            PreferenceKind::Favorite => Self::FavoritesUpdated,
            PreferenceKind::Dislike => Self::DislikesUpdated,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FavoritesUpdated => "favoritesUpdated",
            Self::DislikesUpdated => "dislikesUpdated",
        }
    }
}

type Senders = HashMap<u64, mpsc::UnboundedSender<Notification>>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    subscribers: Mutex<Senders>,
}

impl Registry {
    fn senders(&self) -> std::sync::MutexGuard<'_, Senders> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publish/subscribe registry shared by the synchronizer and its observers
///
/// Clones share one registry.
#[derive(Clone, Default)]
pub struct NotificationBus {
    registry: Arc<Registry>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer
    pub fn subscribe(&self) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry.senders().insert(id, tx);

        tracing::trace!(subscriber = id, "Observer subscribed");

        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `notification` to every live subscriber.
    ///
    /// Returns the number of subscribers reached.
    pub fn publish(&self, notification: Notification) -> usize {
        let mut senders = self.registry.senders();
        senders.retain(|_, tx| tx.send(notification).is_ok());

        tracing::debug!(
            notification = notification.name(),
            subscribers = senders.len(),
            "Published notification"
        );
        senders.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.senders().len()
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Receiving end of a bus registration
///
/// Unregisters on drop.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<Notification>,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Wait for the next notification.
    ///
    /// Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Next notification if one is already queued
    pub fn try_recv(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }

    /// Take everything queued so far
    pub fn drain(&mut self) -> Vec<Notification> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.senders().remove(&self.id);
            tracing::trace!(subscriber = self.id, "Observer unsubscribed");
        }
    }
}
