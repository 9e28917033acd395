//! Subscriber variants with different unregistration strategies.
//!
//! All four variants subscribe to the bus on construction and differ in two
//! ways only: whether the callback holds its subscriber weakly or strongly,
//! and whether (and how) the registration is removed when the subscriber is
//! released.
//!
//! | Variant | Back-reference | Removed on release |
//! |---|---|---|
//! | [`NeverUnregistersObserver`] | weak | never (leak) |
//! | [`UnregistersOnReleaseObserver`] | weak | in `Drop` |
//! | [`StrongRefObserver`] | strong | `Drop` never runs (cycle, leak) |
//! | [`HandleWrappedObserver`] | weak | by its [`AutoUnsubscribingHandle`](crate::bus::AutoUnsubscribingHandle) |

mod handle_wrapped;
mod never_unregisters;
mod strong_ref;
mod unregisters_on_release;

pub use handle_wrapped::HandleWrappedObserver;
pub use never_unregisters::NeverUnregistersObserver;
pub use strong_ref::StrongRefObserver;
pub use unregisters_on_release::UnregistersOnReleaseObserver;

use crate::bus::NotificationBus;
use crate::error::Error;
use crate::ledger::{InvocationKey, InvocationLedger};
use crate::types::{EventName, Notification};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// Services a subscriber is created against.
#[derive(Clone, Debug, Default)]
pub struct ObserverContext {
    pub bus: Arc<NotificationBus>,
    pub ledger: Arc<InvocationLedger>,
}

impl ObserverContext {
    pub fn new(bus: Arc<NotificationBus>, ledger: Arc<InvocationLedger>) -> Self {
        Self { bus, ledger }
    }
}

/// State shared by every variant.
#[derive(Debug)]
pub struct ObserverCore {
    event_name: EventName,
    number: u64,
    received: AtomicU64,
    ledger: Arc<InvocationLedger>,
}

impl ObserverCore {
    pub fn new(ctx: &ObserverContext, event_name: EventName, number: u64) -> Self {
        Self {
            event_name,
            number,
            received: AtomicU64::new(0),
            ledger: Arc::clone(&ctx.ledger),
        }
    }

    pub fn event_name(&self) -> &EventName {
        &self.event_name
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }

    pub fn key(&self) -> InvocationKey {
        InvocationKey::new(&self.event_name, self.number)
    }

    pub fn ledger(&self) -> Arc<InvocationLedger> {
        Arc::clone(&self.ledger)
    }

    fn deliver(&self, variant: Variant, notification: &Notification) {
        let received = self.received.fetch_add(1, Ordering::SeqCst) + 1;
        self.ledger.record_delivery(&self.key());
        info!(
            observer = %describe(variant, self.number),
            event = %notification.name,
            received,
            "received notification"
        );
    }
}

/// A subscriber attached to the notification bus.
pub trait Observer: Send + Sync {
    fn core(&self) -> &ObserverCore;

    fn variant(&self) -> Variant;

    fn event_name(&self) -> &EventName {
        self.core().event_name()
    }

    fn number(&self) -> u64 {
        self.core().number()
    }

    /// Notifications that reached this subscriber's state.
    fn received(&self) -> u64 {
        self.core().received()
    }

    fn description(&self) -> String {
        describe(self.variant(), self.number())
    }

    /// Called once the callback has resolved its back-reference.
    fn handle_event(&self, notification: &Notification) {
        self.core().deliver(self.variant(), notification);
    }
}

fn describe(variant: Variant, number: u64) -> String {
    format!("<{}> number: {}", variant.type_name(), number)
}

/// Build a callback that holds its subscriber weakly.
///
/// Once the subscriber is gone the callback still runs (and is counted as an
/// entry) but touches nothing else.
fn weak_callback<O>(
    observer: Weak<O>,
    ledger: Arc<InvocationLedger>,
    key: InvocationKey,
) -> impl Fn(&Notification) + Send + Sync + 'static
where
    O: Observer + 'static,
{
    move |notification: &Notification| {
        debug!(event = %notification.name, number = key.number, "entering notification handler");
        ledger.record_entry(&key);
        let Some(observer) = observer.upgrade() else {
            debug!(event = %notification.name, number = key.number, "observer is gone");
            return;
        };
        observer.handle_event(notification);
    }
}

/// The four unregistration strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    NeverUnregisters,
    UnregistersOnRelease,
    StrongRefUnregistersOnRelease,
    HandleWrapped,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::NeverUnregisters,
        Variant::UnregistersOnRelease,
        Variant::StrongRefUnregistersOnRelease,
        Variant::HandleWrapped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::NeverUnregisters => "never_unregisters",
            Variant::UnregistersOnRelease => "unregisters_on_release",
            Variant::StrongRefUnregistersOnRelease => "strong_ref_unregisters_on_release",
            Variant::HandleWrapped => "handle_wrapped",
        }
    }

    /// Name of the implementing type, used in descriptions.
    pub fn type_name(self) -> &'static str {
        match self {
            Variant::NeverUnregisters => "NeverUnregistersObserver",
            Variant::UnregistersOnRelease => "UnregistersOnReleaseObserver",
            Variant::StrongRefUnregistersOnRelease => "StrongRefObserver",
            Variant::HandleWrapped => "HandleWrappedObserver",
        }
    }

    /// Whether releasing a subscriber of this variant leaves its
    /// registration on the bus.
    pub fn leaks_on_release(self) -> bool {
        matches!(
            self,
            Variant::NeverUnregisters | Variant::StrongRefUnregistersOnRelease
        )
    }

    pub fn title(self) -> &'static str {
        match self {
            Variant::NeverUnregisters => "Observer never unregisters; holds itself weakly in the callback.",
            Variant::UnregistersOnRelease => "Observer unregisters on drop; holds itself weakly in the callback.",
            Variant::StrongRefUnregistersOnRelease => "Observer unregisters on drop; holds itself strongly in the callback.",
            Variant::HandleWrapped => "Observer stores its token in an auto-unsubscribing handle.",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Variant::NeverUnregisters => {
                "Observers:\n\
                 - subscribe with a callback and store the returned token.\n\
                 - hold only a weak reference to themselves in the callback.\n\
                 - never call unsubscribe, so the registration outlives them."
            }
            Variant::UnregistersOnRelease => {
                "Observers:\n\
                 - subscribe with a callback and store the returned token.\n\
                 - hold only a weak reference to themselves in the callback.\n\
                 - call unsubscribe from Drop."
            }
            Variant::StrongRefUnregistersOnRelease => {
                "Observers:\n\
                 - subscribe with a callback and store the returned token.\n\
                 - hold a strong reference to themselves in the callback.\n\
                 - call unsubscribe from Drop, which never runs: the bus keeps\n\
                   the callback, the callback keeps the observer."
            }
            Variant::HandleWrapped => {
                "Observers:\n\
                 - subscribe through NotificationBus::observe and keep the handle.\n\
                 - hold only a weak reference to themselves in the callback.\n\
                 - never call unsubscribe; dropping the handle does it."
            }
        }
    }

    /// Create a subscriber of this variant. It is registered on return.
    pub fn create(
        self,
        ctx: &ObserverContext,
        event_name: impl Into<EventName>,
        number: u64,
    ) -> Arc<dyn Observer> {
        match self {
            Variant::NeverUnregisters => NeverUnregistersObserver::new(ctx, event_name, number),
            Variant::UnregistersOnRelease => {
                UnregistersOnReleaseObserver::new(ctx, event_name, number)
            }
            Variant::StrongRefUnregistersOnRelease => StrongRefObserver::new(ctx, event_name, number),
            Variant::HandleWrapped => HandleWrappedObserver::new(ctx, event_name, number),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::UnknownVariant(s.to_string()))
    }
}
