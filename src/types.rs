//! Core types shared by the bus, observers and harness.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of a notification channel. Equality is exact string match.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(String);

impl EventName {
    pub fn new(name: impl Into<String>) -> Self {
        EventName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventName({:?})", self.0)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        EventName(name.to_string())
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        EventName(name)
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}

impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a single registration, unique per bus.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(pub u64);

impl fmt::Debug for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistrationId({})", self.0)
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one registration for later removal.
///
/// A token is plain data: it does not own the callback and dropping it does
/// not unsubscribe anything. Wrap it in an
/// [`AutoUnsubscribingHandle`](crate::bus::AutoUnsubscribingHandle) for that.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionToken {
    pub event_name: EventName,
    pub id: RegistrationId,
}

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.event_name, self.id)
    }
}

/// The value delivered to callbacks on publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub name: EventName,
    /// Free-form label of whoever posted, if any.
    pub sender: Option<String>,
}

impl Notification {
    pub fn new(name: impl Into<EventName>) -> Self {
        Self {
            name: name.into(),
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}
