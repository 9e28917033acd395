//! Strong back-reference: an intentional reference cycle.
//!
//! The bus owns the callback, the callback owns an `Arc` of the observer, and
//! only the observer's `Drop` would unsubscribe. Dropping every outside
//! reference therefore never reaches `Drop` and the registration leaks. This
//! type exists to reproduce that leak; do not "fix" it.
//!
//! [`StrongRefObserver::unregister`] breaks the cycle by hand.

use crate::bus::NotificationBus;
use crate::types::{EventName, Notification, SubscriptionToken};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

use super::{Observer, ObserverContext, ObserverCore, Variant};

pub struct StrongRefObserver {
    core: ObserverCore,
    bus: Arc<NotificationBus>,
    /// Filled in right after subscribing, since the callback needs the `Arc`
    /// before the token exists.
    token: Mutex<Option<SubscriptionToken>>,
}

impl StrongRefObserver {
    pub fn new(ctx: &ObserverContext, event_name: impl Into<EventName>, number: u64) -> Arc<Self> {
        let event_name = event_name.into();
        let observer = Arc::new(Self {
            core: ObserverCore::new(ctx, event_name.clone(), number),
            bus: Arc::clone(&ctx.bus),
            token: Mutex::new(None),
        });

        let this = Arc::clone(&observer);
        let ledger = observer.core.ledger();
        let key = observer.core.key();
        let token = ctx.bus.subscribe(event_name, move |notification: &Notification| {
            debug!(event = %notification.name, number = key.number, "entering notification handler");
            ledger.record_entry(&key);
            this.handle_event(notification);
        });
        *observer.token.lock() = Some(token);

        observer
    }

    pub fn token(&self) -> Option<SubscriptionToken> {
        self.token.lock().clone()
    }

    /// Unsubscribe explicitly, releasing the callback's reference to `self`.
    ///
    /// Idempotent. Returns false if there was nothing to remove.
    pub fn unregister(&self) -> bool {
        let token = self.token.lock().take();
        match token {
            Some(token) => {
                debug!(observer = %self.description(), token = %token, "breaking reference cycle");
                self.bus.unsubscribe(&token)
            }
            None => false,
        }
    }
}

impl Observer for StrongRefObserver {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    fn variant(&self) -> Variant {
        Variant::StrongRefUnregistersOnRelease
    }
}

impl Drop for StrongRefObserver {
    // Unreachable while the registration exists.
    fn drop(&mut self) {
        let token = self.token.get_mut().take();
        info!(observer = %self.description(), token = ?token, "dropping observer");
        if let Some(token) = token {
            debug!(token = %token, "unregistering notification observer");
            self.bus.unsubscribe(&token);
        }
    }
}
