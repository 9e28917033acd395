//! Side-channel invocation counters.
//!
//! Callbacks hold the ledger strongly, independent of their subscriber, so it
//! keeps counting after a subscriber is gone. Two counts are kept per
//! `(event name, subscriber number)`:
//! - entries: the callback ran at all
//! - deliveries: the callback reached live subscriber state

use crate::types::EventName;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Ledger key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InvocationKey {
    pub event_name: EventName,
    pub number: u64,
}

impl InvocationKey {
    pub fn new(event_name: impl Into<EventName>, number: u64) -> Self {
        Self {
            event_name: event_name.into(),
            number,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Counts {
    entries: u64,
    deliveries: u64,
}

/// Thread-safe invocation counters.
#[derive(Debug, Default)]
pub struct InvocationLedger {
    counts: Mutex<HashMap<InvocationKey, Counts>>,
}

impl InvocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback for `key` was entered.
    pub fn record_entry(&self, key: &InvocationKey) {
        self.counts.lock().entry(key.clone()).or_default().entries += 1;
    }

    /// A callback for `key` touched live subscriber state.
    pub fn record_delivery(&self, key: &InvocationKey) {
        self.counts.lock().entry(key.clone()).or_default().deliveries += 1;
    }

    pub fn entries(&self, event_name: &str, number: u64) -> u64 {
        self.get(event_name, number).entries
    }

    pub fn deliveries(&self, event_name: &str, number: u64) -> u64 {
        self.get(event_name, number).deliveries
    }

    /// Entries across every subscriber of `event_name`.
    pub fn total_entries(&self, event_name: &str) -> u64 {
        self.counts
            .lock()
            .iter()
            .filter(|(key, _)| key.event_name.as_str() == event_name)
            .map(|(_, counts)| counts.entries)
            .sum()
    }

    pub fn reset(&self) {
        self.counts.lock().clear();
    }

    fn get(&self, event_name: &str, number: u64) -> Counts {
        let key = InvocationKey::new(event_name, number);
        self.counts.lock().get(&key).copied().unwrap_or_default()
    }
}
