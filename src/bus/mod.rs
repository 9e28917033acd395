//! In-process notification bus.
//!
//! Callbacks are registered under an event name and invoked synchronously
//! when that name is published. Registrations live until their token is
//! unsubscribed:
//! - A [`SubscriptionToken`](crate::SubscriptionToken) is plain data and
//!   removes nothing on drop
//! - An [`AutoUnsubscribingHandle`] removes its registration exactly once,
//!   on release or drop
//!
//! # Example
//!
//! ```
//! use notification_lifetimes::NotificationBus;
//! use std::sync::Arc;
//!
//! let bus = Arc::new(NotificationBus::new());
//!
//! let token = bus.subscribe("E", |n| println!("got {}", n.name));
//! assert_eq!(bus.publish("E"), 1);
//! bus.unsubscribe(&token);
//! assert_eq!(bus.publish("E"), 0);
//!
//! {
//!     let _handle = bus.observe("E", |_| {});
//!     assert_eq!(bus.registration_count("E"), 1);
//! }
//! assert_eq!(bus.registration_count("E"), 0);
//! ```

mod handle;
mod manager;

pub use handle::AutoUnsubscribingHandle;
pub use manager::{Callback, NotificationBus};
