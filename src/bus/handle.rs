//! RAII wrapper that unsubscribes its token exactly once.

use crate::types::SubscriptionToken;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::manager::NotificationBus;

/// Owns a [`SubscriptionToken`] and removes its registration from the bus
/// when released or dropped, whichever happens first.
pub struct AutoUnsubscribingHandle {
    bus: Arc<NotificationBus>,
    /// `None` once the registration has been removed.
    token: Option<SubscriptionToken>,
}

impl AutoUnsubscribingHandle {
    /// Take ownership of `token`.
    pub fn new(bus: Arc<NotificationBus>, token: SubscriptionToken) -> Self {
        Self {
            bus,
            token: Some(token),
        }
    }

    /// The wrapped token, until the handle has been released.
    pub fn token(&self) -> Option<&SubscriptionToken> {
        self.token.as_ref()
    }

    /// Whether the handle still owns its registration.
    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// Unsubscribe now. Returns false if this handle already did so.
    pub fn release(&mut self) -> bool {
        match self.token.take() {
            Some(token) => {
                debug!(token = %token, "handle released: unregistering");
                self.bus.unsubscribe(&token);
                true
            }
            None => false,
        }
    }
}

impl Drop for AutoUnsubscribingHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for AutoUnsubscribingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoUnsubscribingHandle")
            .field("token", &self.token)
            .finish()
    }
}
