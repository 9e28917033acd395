//! Weak back-reference, no cleanup: the registration outlives the observer.

use crate::types::{EventName, SubscriptionToken};
use std::sync::Arc;
use tracing::debug;

use super::{weak_callback, Observer, ObserverContext, ObserverCore, Variant};

pub struct NeverUnregistersObserver {
    core: ObserverCore,
    /// Stored but never used to unsubscribe.
    token: SubscriptionToken,
}

impl NeverUnregistersObserver {
    pub fn new(ctx: &ObserverContext, event_name: impl Into<EventName>, number: u64) -> Arc<Self> {
        let event_name = event_name.into();
        Arc::new_cyclic(|weak| {
            let core = ObserverCore::new(ctx, event_name.clone(), number);
            let callback = weak_callback(weak.clone(), core.ledger(), core.key());
            let token = ctx.bus.subscribe(event_name, callback);
            Self { core, token }
        })
    }

    pub fn token(&self) -> &SubscriptionToken {
        &self.token
    }
}

impl Observer for NeverUnregistersObserver {
    fn core(&self) -> &ObserverCore {
        &self.core
    }

    fn variant(&self) -> Variant {
        Variant::NeverUnregisters
    }
}

impl Drop for NeverUnregistersObserver {
    fn drop(&mut self) {
        debug!(
            observer = %self.description(),
            token = %self.token,
            "dropped without unregistering"
        );
    }
}
