//! Integration tests for subscription lifetimes.

use notification_lifetimes::{
    Demo, DemoConfig, Harness, NotificationBus, ObserverContext, TabConfig, Variant,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

fn tab(variant: Variant) -> Harness {
    init_tracing();
    Harness::new(ObserverContext::default(), TabConfig::numbered(1, variant))
}

const EVENT: &str = "Tab_1_Notification";

// --- Bus Scenarios ---

#[test]
fn test_unsubscribe_ends_observation() {
    init_tracing();
    let bus = NotificationBus::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&calls);

    let token = bus.subscribe("E", move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    bus.publish("E");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    bus.unsubscribe(&token);
    bus.publish("E");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dropping_token_keeps_callback_alive() {
    init_tracing();
    let bus = NotificationBus::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&calls);

    let token = bus.subscribe("E", move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    bus.publish("E");
    drop(token);
    bus.publish("E");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_dropping_handle_ends_observation() {
    init_tracing();
    let bus = Arc::new(NotificationBus::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&calls);

    let handle = bus.observe("E", move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    bus.publish("E");
    drop(handle);
    bus.publish("E");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// --- Variant Scenarios ---

#[test]
fn test_never_unregisters_leaks_registration() {
    let mut tab = tab(Variant::NeverUnregisters);
    let observer = tab.create_next();

    assert_eq!(tab.post(), 1);
    assert_eq!(tab.received(&observer), Some(1));

    tab.release_subscriber(&observer).unwrap();
    assert!(!observer.is_alive());
    assert_eq!(tab.bus().registration_count(EVENT), 1);

    // Callback still runs, but the observer is gone.
    assert_eq!(tab.post(), 1);
    assert_eq!(tab.ledger().entries(EVENT, 1), 2);
    assert_eq!(tab.ledger().deliveries(EVENT, 1), 1);
}

#[test]
fn test_unregisters_on_release() {
    let mut tab = tab(Variant::UnregistersOnRelease);
    let observer = tab.create_next();

    assert_eq!(tab.post(), 1);
    assert_eq!(tab.received(&observer), Some(1));
    assert_eq!(tab.bus().registration_count(EVENT), 1);

    tab.release_subscriber(&observer).unwrap();
    assert!(!observer.is_alive());
    assert_eq!(tab.bus().registration_count(EVENT), 0);

    assert_eq!(tab.post(), 0);
    assert_eq!(tab.ledger().entries(EVENT, 1), 1);
    assert_eq!(tab.ledger().deliveries(EVENT, 1), 1);
}

#[test]
fn test_strong_ref_cycle_survives_release() {
    let mut tab = tab(Variant::StrongRefUnregistersOnRelease);
    let observer = tab.create_next();

    assert_eq!(tab.post(), 1);
    assert_eq!(tab.ledger().deliveries(EVENT, 1), 1);

    tab.release_subscriber(&observer).unwrap();
    assert_eq!(tab.subscriber_count(), 0);

    // Drop never ran: the bus keeps the observer alive.
    assert!(observer.is_alive());
    assert_eq!(tab.bus().registration_count(EVENT), 1);

    assert_eq!(tab.post(), 1);
    assert_eq!(tab.ledger().deliveries(EVENT, 1), 2);
    assert_eq!(tab.received(&observer), Some(2));

    // Only tearing down the registration frees it.
    tab.bus().reset();
    assert!(!observer.is_alive());
}

#[test]
fn test_handle_wrapped_unregisters_on_release() {
    let mut tab = tab(Variant::HandleWrapped);
    let observer = tab.create_next();

    assert_eq!(tab.post(), 1);
    assert_eq!(tab.received(&observer), Some(1));

    tab.release_subscriber(&observer).unwrap();
    assert!(!observer.is_alive());
    assert_eq!(tab.bus().registration_count(EVENT), 0);

    assert_eq!(tab.post(), 0);
    assert_eq!(tab.ledger().entries(EVENT, 1), 1);
}

#[test]
fn test_every_variant_counts_first_post_once() {
    for variant in Variant::ALL {
        let mut tab = tab(variant);
        let observer = tab.create_subscriber(EVENT, 42);

        tab.post_event(EVENT);

        assert_eq!(tab.received(&observer), Some(1), "{variant}");
        assert_eq!(tab.ledger().deliveries(EVENT, 42), 1, "{variant}");
        tab.bus().reset();
    }
}

#[test]
fn test_leaks_match_variant_flag() {
    for variant in Variant::ALL {
        let mut tab = tab(variant);
        tab.create_next();
        tab.release_last().unwrap();

        let leaked = tab.bus().registration_count(EVENT) == 1;
        assert_eq!(leaked, variant.leaks_on_release(), "{variant}");
        tab.bus().reset();
    }
}

// --- Realistic Workflow Tests ---

#[test]
fn test_sample_app_session() {
    init_tracing();
    let mut demo = Demo::new(DemoConfig::default()).unwrap();

    // Create, post, release, post on every tab.
    for i in 0..4 {
        let tab = demo.tab_mut(i).unwrap();
        tab.create_next();
        tab.create_next();
        assert_eq!(tab.post(), 2);
        tab.release_last().unwrap();
        tab.release_last().unwrap();
        assert!(tab.release_last().is_err());
    }

    let invoked: Vec<usize> = demo.tabs().iter().map(|tab| tab.post()).collect();
    assert_eq!(invoked, vec![2, 0, 2, 0]);

    // Leaked weak observers no longer deliver; the cycle still does.
    let ledger = demo.ledger();
    assert_eq!(ledger.deliveries("Tab_1_Notification", 1), 1);
    assert_eq!(ledger.entries("Tab_1_Notification", 1), 2);
    assert_eq!(ledger.deliveries("Tab_3_Notification", 1), 2);
    assert_eq!(ledger.deliveries("Tab_3_Notification", 2), 2);

    assert_eq!(demo.bus().total_registrations(), 4);
}

#[test]
fn test_leaked_registrations_accumulate() {
    let mut tab = tab(Variant::NeverUnregisters);

    for _ in 0..5 {
        tab.create_next();
        tab.release_last().unwrap();
    }

    assert_eq!(tab.subscriber_count(), 0);
    assert_eq!(tab.bus().registration_count(EVENT), 5);
    assert_eq!(tab.post(), 5);
    assert_eq!(tab.ledger().total_entries(EVENT), 5);
}

#[test]
fn test_bus_usable_from_other_threads() {
    init_tracing();
    let ctx = ObserverContext::default();
    let observer = Variant::UnregistersOnRelease.create(&ctx, "E", 1);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let bus = Arc::clone(&ctx.bus);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    bus.publish("E");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(observer.received(), 100);
    drop(observer);
    assert_eq!(ctx.bus.total_registrations(), 0);
}
