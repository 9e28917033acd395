//! Notification bus: registry of callbacks keyed by event name.

use crate::types::{EventName, Notification, RegistrationId, SubscriptionToken};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

use super::handle::AutoUnsubscribingHandle;

/// Callback invoked for every matching publish.
pub type Callback = dyn Fn(&Notification) + Send + Sync;

/// Internal registration state.
struct Registration {
    id: RegistrationId,
    callback: Arc<Callback>,
}

/// Publish/subscribe registry.
///
/// Construct one explicitly and share it as `Arc<NotificationBus>`; there is
/// no global instance. All methods take `&self`. The registry lock is never
/// held while a callback runs, so callbacks may subscribe and unsubscribe.
pub struct NotificationBus {
    /// Registrations per event name, in insertion order.
    registry: Mutex<HashMap<EventName, Vec<Registration>>>,
    /// Counter for generating registration IDs.
    next_id: AtomicU64,
}

impl NotificationBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `callback` under `event_name`.
    ///
    /// The returned token is the only way to remove the registration later.
    /// Dropping the token does not unsubscribe.
    pub fn subscribe<F>(&self, event_name: impl Into<EventName>, callback: F) -> SubscriptionToken
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let event_name = event_name.into();
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::SeqCst));

        self.registry
            .lock()
            .entry(event_name.clone())
            .or_default()
            .push(Registration {
                id,
                callback: Arc::new(callback),
            });

        debug!(event = %event_name, id = id.0, "registered observer");
        SubscriptionToken { event_name, id }
    }

    /// Subscribe and wrap the token so the registration is removed when the
    /// returned handle is released or dropped.
    pub fn observe<F>(
        self: &Arc<Self>,
        event_name: impl Into<EventName>,
        callback: F,
    ) -> AutoUnsubscribingHandle
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let token = self.subscribe(event_name, callback);
        AutoUnsubscribingHandle::new(Arc::clone(self), token)
    }

    /// Remove the registration identified by `token`.
    ///
    /// Returns false if it was already removed or never existed.
    pub fn unsubscribe(&self, token: &SubscriptionToken) -> bool {
        let removed = {
            let mut registry = self.registry.lock();
            let Some(registrations) = registry.get_mut(token.event_name.as_str()) else {
                return false;
            };
            let Some(pos) = registrations.iter().position(|r| r.id == token.id) else {
                return false;
            };
            let removed = registrations.remove(pos);
            if registrations.is_empty() {
                registry.remove(token.event_name.as_str());
            }
            removed
        };

        debug!(event = %token.event_name, id = token.id.0, "unregistered observer");
        // The callback may own a subscriber whose Drop unsubscribes, so it
        // must be released after the registry lock.
        drop(removed);
        true
    }

    /// Publish a bare notification for `event_name`.
    ///
    /// Returns the number of callbacks invoked.
    pub fn publish(&self, event_name: impl Into<EventName>) -> usize {
        self.post(&Notification::new(event_name))
    }

    /// Invoke every callback registered for `notification.name`.
    ///
    /// Callbacks run synchronously in registration order against a snapshot
    /// taken at the start of the call: a registration removed by a callback
    /// is still invoked in this round, one added is not.
    pub fn post(&self, notification: &Notification) -> usize {
        let snapshot: Vec<Arc<Callback>> = {
            let registry = self.registry.lock();
            match registry.get(notification.name.as_str()) {
                Some(registrations) => registrations
                    .iter()
                    .map(|r| Arc::clone(&r.callback))
                    .collect(),
                None => return 0,
            }
        };

        trace!(
            event = %notification.name,
            callbacks = snapshot.len(),
            "posting notification"
        );
        for callback in &snapshot {
            callback(notification);
        }
        snapshot.len()
    }

    /// Number of live registrations for `event_name`.
    pub fn registration_count(&self, event_name: &str) -> usize {
        self.registry.lock().get(event_name).map_or(0, Vec::len)
    }

    /// Number of live registrations across all event names.
    pub fn total_registrations(&self) -> usize {
        self.registry.lock().values().map(Vec::len).sum()
    }

    /// Whether the registration behind `token` still exists.
    pub fn is_registered(&self, token: &SubscriptionToken) -> bool {
        self.registry
            .lock()
            .get(token.event_name.as_str())
            .is_some_and(|regs| regs.iter().any(|r| r.id == token.id))
    }

    /// Event names with at least one registration, sorted.
    pub fn event_names(&self) -> Vec<EventName> {
        let mut names: Vec<EventName> = self.registry.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove every registration. Returns how many were removed.
    ///
    /// This also breaks any reference cycle running through a callback.
    pub fn reset(&self) -> usize {
        let drained = std::mem::take(&mut *self.registry.lock());
        let count = drained.values().map(Vec::len).sum();
        debug!(removed = count, "reset notification bus");
        drop(drained);
        count
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventName, usize> = self
            .registry
            .lock()
            .iter()
            .map(|(name, regs)| (name.clone(), regs.len()))
            .collect();
        f.debug_struct("NotificationBus")
            .field("registrations", &counts)
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .finish()
    }
}
