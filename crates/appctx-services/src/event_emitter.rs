//! In-process event bus
//!
//! Provides [`EventEmitter`]: synchronous publish/subscribe keyed by event name.
//! Listeners are called on the emitting thread, in subscription order.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`EventEmitter::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Synchronous event emitter
#[derive(Default)]
pub struct EventEmitter {
    listeners: RwLock<HashMap<String, Vec<(ListenerId, Listener)>>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    /// Create emitter with no listeners
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to an event
    pub fn add_listener<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .entry(event.into())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Unsubscribe a listener
    ///
    /// Returns `false` if it was not subscribed to `event`.
    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(subscribed) = listeners.get_mut(event) else {
            return false;
        };
        let before = subscribed.len();
        subscribed.retain(|(listener_id, _)| *listener_id != id);
        let removed = subscribed.len() != before;
        if subscribed.is_empty() {
            listeners.remove(event);
        }
        removed
    }

    /// Drop every listener of an event
    pub fn remove_all_listeners(&self, event: &str) {
        self.listeners.write().remove(event);
    }

    /// Call every listener of `event` with `detail`
    ///
    /// Listeners run without the emitter's lock held, so they may subscribe,
    /// unsubscribe, or emit. Returns how many listeners were called.
    pub fn emit(&self, event: &str, detail: &Value) -> usize {
        let snapshot: Vec<Listener> = match self.listeners.read().get(event) {
            Some(subscribed) => subscribed.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => return 0,
        };

        tracing::trace!(event, listeners = snapshot.len(), "emitting event");
        for listener in &snapshot {
            listener(detail);
        }
        snapshot.len()
    }

    /// Number of listeners subscribed to `event`
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }

    /// Event names with at least one listener, sorted
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("events", &self.event_names())
            .finish_non_exhaustive()
    }
}
