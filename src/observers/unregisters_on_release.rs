//! Weak back-reference, unsubscribes from `Drop`.

use crate::bus::NotificationBus;
use crate::types::{EventName, SubscriptionToken};
use std::sync::Arc;
use tracing::{debug, info};

use super::{weak_callback, Observer, ObserverContext, ObserverCore, Variant};

pub struct UnregistersOnReleaseObserver {
    core: ObserverCore,
    bus: Arc<NotificationBus>,
    token: Option<SubscriptionToken>,
}

impl UnregistersOnReleaseObserver {
    pub fn new(ctx: &ObserverContext, event_name: impl Into<EventName>, number: u64) -> Arc<Self> {
        let event_name = event_name.into();
        Arc::new_cyclic(|weak| {
            let core = ObserverCore::new(ctx, event_name.clone(), number);
            let callback = weak_callback(weak.clone(), core.ledger(), core.key());
            let token = ctx.bus.subscribe(event_name, callback);
            Self {
                core,
                bus: Arc::clone(&ctx.bus),
                token: Some(token),
            }
        })
    }

    pub fn token(&self) -> Option<&SubscriptionToken> {
        self.token.as_ref()
    }
}

impl Observer for UnregistersOnReleaseObserver {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    fn variant(&self) -> Variant {
        Variant::UnregistersOnRelease
    }
}

impl Drop for UnregistersOnReleaseObserver {
    fn drop(&mut self) {
        info!(observer = %self.description(), token = ?self.token, "dropping observer");
        if let Some(token) = self.token.take() {
            debug!(token = %token, "unregistering notification observer");
            self.bus.unsubscribe(&token);
        }
    }
}
