//! Weak back-reference, token absorbed into an auto-unsubscribing handle.

use crate::bus::AutoUnsubscribingHandle;
use crate::types::{EventName, SubscriptionToken};
use std::sync::Arc;
use tracing::debug;

use super::{weak_callback, Observer, ObserverContext, ObserverCore, Variant};

pub struct HandleWrappedObserver {
    core: ObserverCore,
    /// Unsubscribes when this observer's fields are dropped.
    handle: AutoUnsubscribingHandle,
}

impl HandleWrappedObserver {
    pub fn new(ctx: &ObserverContext, event_name: impl Into<EventName>, number: u64) -> Arc<Self> {
        let event_name = event_name.into();
        Arc::new_cyclic(|weak| {
            let core = ObserverCore::new(ctx, event_name.clone(), number);
            let callback = weak_callback(weak.clone(), core.ledger(), core.key());
            let handle = ctx.bus.observe(event_name, callback);
            Self { core, handle }
        })
    }

    pub fn token(&self) -> Option<&SubscriptionToken> {
        self.handle.token()
    }
}

impl Observer for HandleWrappedObserver {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    fn variant(&self) -> Variant {
        Variant::HandleWrapped
    }
}

impl Drop for HandleWrappedObserver {
    fn drop(&mut self) {
        debug!(observer = %self.description(), "dropping observer");
    }
}
