//! Drivers for the three demo actions: create, post, release.
//!
//! A [`Harness`] stands in for one tab of the sample app and owns the
//! subscribers it creates. Releasing a subscriber drops the harness's
//! reference; whether that actually ends the subscription depends on the
//! variant.

use crate::bus::NotificationBus;
use crate::config::{DemoConfig, TabConfig};
use crate::error::{Error, Result};
use crate::ledger::InvocationLedger;
use crate::observers::{Observer, ObserverContext, Variant};
use crate::types::{EventName, Notification};
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// Refers to a subscriber created by a [`Harness`].
///
/// Does not keep the subscriber alive. Two handles are equal when they refer
/// to the same subscriber, regardless of number.
#[derive(Clone, Debug)]
pub struct SubscriberHandle {
    event_name: EventName,
    number: u64,
    variant: Variant,
    observer: Weak<dyn Observer>,
}

impl SubscriberHandle {
    fn from_observer(observer: &Arc<dyn Observer>) -> Self {
        Self {
            event_name: observer.event_name().clone(),
            number: observer.number(),
            variant: observer.variant(),
            observer: Arc::downgrade(observer),
        }
    }

    pub fn event_name(&self) -> &EventName {
        &self.event_name
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Whether the subscriber still exists, held by anyone.
    pub fn is_alive(&self) -> bool {
        self.observer.strong_count() > 0
    }

    fn refers_to(&self, observer: &Arc<dyn Observer>) -> bool {
        Weak::ptr_eq(&self.observer, &Arc::downgrade(observer))
    }
}

impl PartialEq for SubscriberHandle {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.observer, &other.observer)
    }
}

impl Eq for SubscriberHandle {}

/// One tab: creates subscribers of a single variant and posts its event.
pub struct Harness {
    ctx: ObserverContext,
    config: TabConfig,
    /// Subscribers in creation order.
    observers: Vec<Arc<dyn Observer>>,
    next_number: u64,
}

impl Harness {
    pub fn new(ctx: ObserverContext, config: TabConfig) -> Self {
        Self {
            ctx,
            config,
            observers: Vec::new(),
            next_number: 1,
        }
    }

    /// Create a subscriber of this tab's variant on `event_name`.
    pub fn create_subscriber(
        &mut self,
        event_name: impl Into<EventName>,
        number: u64,
    ) -> SubscriberHandle {
        let observer = self.config.variant.create(&self.ctx, event_name, number);
        self.next_number = self.next_number.max(number.saturating_add(1));

        let handle = SubscriberHandle::from_observer(&observer);
        info!(
            tab = %self.config.title,
            observer = %observer.description(),
            registrations = self.ctx.bus.registration_count(observer.event_name().as_str()),
            "created observer"
        );
        self.observers.push(observer);
        handle
    }

    /// Create a subscriber on this tab's event with the next free number.
    pub fn create_next(&mut self) -> SubscriberHandle {
        let event_name = self.config.event_name.clone();
        self.create_subscriber(event_name, self.next_number)
    }

    /// Post `event_name` with this tab as sender. Returns callbacks invoked.
    pub fn post_event(&self, event_name: impl Into<EventName>) -> usize {
        let notification = Notification::new(event_name).with_sender(self.config.title.as_str());
        info!(tab = %self.config.title, event = %notification.name, "posting notification");

        let invoked = self.ctx.bus.post(&notification);
        debug!(
            event = %notification.name,
            invoked,
            entries = self.ctx.ledger.total_entries(notification.name.as_str()),
            "posted notification"
        );
        invoked
    }

    /// Post this tab's own event.
    pub fn post(&self) -> usize {
        self.post_event(self.config.event_name.clone())
    }

    /// Drop the harness's reference to the subscriber behind `handle`.
    pub fn release_subscriber(&mut self, handle: &SubscriberHandle) -> Result<()> {
        let pos = self
            .observers
            .iter()
            .position(|o| handle.refers_to(o))
            .ok_or_else(|| Error::UnknownSubscriber {
                event_name: handle.event_name.to_string(),
                number: handle.number,
            })?;
        let observer = self.observers.remove(pos);
        self.release(observer);
        Ok(())
    }

    /// Release the most recently created subscriber.
    pub fn release_last(&mut self) -> Result<SubscriberHandle> {
        let Some(observer) = self.observers.pop() else {
            info!(tab = %self.config.title, "there are no observers");
            return Err(Error::NoSubscribers);
        };
        let handle = SubscriberHandle::from_observer(&observer);
        self.release(observer);
        Ok(handle)
    }

    fn release(&self, observer: Arc<dyn Observer>) {
        let description = observer.description();
        let event_name = observer.event_name().clone();
        let weak = Arc::downgrade(&observer);
        drop(observer);

        info!(
            tab = %self.config.title,
            observer = %description,
            still_alive = weak.strong_count() > 0,
            registrations = self.ctx.bus.registration_count(event_name.as_str()),
            "released observer"
        );
    }

    /// Notifications delivered to a subscriber that still exists.
    pub fn received(&self, handle: &SubscriberHandle) -> Option<u64> {
        handle.observer.upgrade().map(|o| o.received())
    }

    /// Subscribers this harness still holds.
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.observers.iter().map(|o| o.description()).collect()
    }

    pub fn config(&self) -> &TabConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.ctx.bus
    }

    pub fn ledger(&self) -> &Arc<InvocationLedger> {
        &self.ctx.ledger
    }
}

/// All tabs of a demo, sharing one bus and ledger.
pub struct Demo {
    ctx: ObserverContext,
    tabs: Vec<Harness>,
}

impl Demo {
    pub fn new(config: DemoConfig) -> Result<Self> {
        config.validate()?;

        let ctx = ObserverContext::default();
        let tabs = config
            .tabs
            .into_iter()
            .map(|tab| Harness::new(ctx.clone(), tab))
            .collect();
        Ok(Self { ctx, tabs })
    }

    pub fn tabs(&self) -> &[Harness] {
        &self.tabs
    }

    pub fn tab(&self, index: usize) -> Option<&Harness> {
        self.tabs.get(index)
    }

    pub fn tab_mut(&mut self, index: usize) -> Option<&mut Harness> {
        self.tabs.get_mut(index)
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.ctx.bus
    }

    pub fn ledger(&self) -> &Arc<InvocationLedger> {
        &self.ctx.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harness(variant: Variant) -> Harness {
        Harness::new(ObserverContext::default(), TabConfig::numbered(1, variant))
    }

    #[test]
    fn test_create_next_numbers() {
        let mut h = harness(Variant::HandleWrapped);
        let a = h.create_next();
        let b = h.create_next();
        assert_eq!((a.number(), b.number()), (1, 2));

        h.release_last().unwrap();
        // Numbers are not reused after a release.
        assert_eq!(h.create_next().number(), 3);

        assert_eq!(
            h.descriptions(),
            vec![
                "<HandleWrappedObserver> number: 1".to_string(),
                "<HandleWrappedObserver> number: 3".to_string(),
            ]
        );
    }

    #[test]
    fn test_create_with_max_number() {
        let mut h = harness(Variant::UnregistersOnRelease);
        let last = h.create_subscriber("Tab_1_Notification", u64::MAX);
        assert_eq!(last.number(), u64::MAX);

        // The next number saturates instead of wrapping.
        assert_eq!(h.create_next().number(), u64::MAX);
        assert_eq!(h.post(), 2);
    }

    #[test]
    fn test_handle_equality_is_identity() {
        let mut h = harness(Variant::HandleWrapped);
        let first = h.create_subscriber("Tab_1_Notification", 5);
        let second = h.create_subscriber("Tab_1_Notification", 5);

        assert_eq!(first, first.clone());
        assert_ne!(first, second);

        h.release_subscriber(&second).unwrap();
        assert!(first.is_alive());
        assert!(!second.is_alive());
        assert_eq!(h.subscriber_count(), 1);
    }

    #[test]
    fn test_release_last_empty() {
        let mut h = harness(Variant::UnregistersOnRelease);
        assert!(matches!(h.release_last(), Err(Error::NoSubscribers)));
    }

    #[test]
    fn test_release_unknown_handle() {
        let mut h = harness(Variant::UnregistersOnRelease);
        let handle = h.create_next();
        h.release_subscriber(&handle).unwrap();

        assert!(matches!(
            h.release_subscriber(&handle),
            Err(Error::UnknownSubscriber { number: 1, .. })
        ));
    }

    #[test]
    fn test_post_uses_tab_event() {
        let mut h = harness(Variant::UnregistersOnRelease);
        let handle = h.create_next();
        h.create_subscriber("elsewhere", 7);

        assert_eq!(h.post(), 1);
        assert_eq!(h.received(&handle), Some(1));
        assert_eq!(h.post_event("elsewhere"), 1);
        assert_eq!(h.subscriber_count(), 2);
    }

    #[test]
    fn test_release_middle_subscriber() {
        let mut h = harness(Variant::UnregistersOnRelease);
        let first = h.create_next();
        let second = h.create_next();
        let third = h.create_next();

        h.release_subscriber(&second).unwrap();
        assert!(!second.is_alive());
        assert!(first.is_alive() && third.is_alive());
        assert_eq!(h.post(), 2);
    }

    #[test]
    fn test_demo_tabs_share_bus() {
        let mut demo = Demo::new(DemoConfig::default()).unwrap();
        assert_eq!(demo.tabs().len(), 4);

        demo.tab_mut(0).unwrap().create_next();
        demo.tab_mut(3).unwrap().create_next();

        assert_eq!(demo.bus().total_registrations(), 2);
        assert_eq!(demo.tab(1).unwrap().post(), 0);
        assert_eq!(demo.tab(3).unwrap().post(), 1);
        assert_eq!(demo.ledger().entries("Tab_4_Notification", 1), 1);
    }

    #[test]
    fn test_demo_rejects_invalid_config() {
        assert!(matches!(
            Demo::new(DemoConfig { tabs: vec![] }),
            Err(Error::InvalidConfig(_))
        ));
    }
}
