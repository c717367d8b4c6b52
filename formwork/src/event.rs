//! Change-notification plumbing shared by field implementations.
//!
//! Fields own one [`Subscribers`] registry per event channel. Handlers are
//! snapshotted before dispatch, so a handler may unsubscribe itself (or
//! other handlers) without poisoning the iteration.

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handler invoked when a field's committed value changes.
pub type ValueChangeHandler = Arc<dyn Fn() + Send + Sync>;

/// Handler invoked with interim text while the user is typing.
pub type TextChangeHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Identifies one subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Id-keyed handler registry for one event channel.
pub struct Subscribers<H> {
    handlers: RwLock<Vec<(SubscriptionId, H)>>,
    next_id: AtomicU64,
}

impl<H: Clone> Subscribers<H> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a handler and return its subscription id.
    pub fn subscribe(&self, handler: H) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.push((id, handler));
        }
        id
    }

    /// Remove a previously registered handler.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.retain(|(existing, _)| *existing != id);
        }
    }

    /// Clone out the current handlers in subscription order.
    pub fn snapshot(&self) -> Vec<H> {
        self.handlers
            .read()
            .map(|handlers| handlers.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }

    /// Check if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.read().map(|h| h.is_empty()).unwrap_or(true)
    }

    /// Get the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.read().map(|h| h.len()).unwrap_or(0)
    }
}

impl<H: Clone> Default for Subscribers<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for Subscribers<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.handlers.read().map(|h| h.len()).unwrap_or(0);
        f.debug_struct("Subscribers")
            .field("handler_count", &count)
            .finish()
    }
}
