//! # Notification Lifetimes
//!
//! A small publish/subscribe bus and four subscriber strategies that show how
//! a subscription's lifetime relates to its subscriber's.
//!
//! ## Core Concepts
//!
//! - **Bus**: registry of callbacks keyed by event name, delivered synchronously
//! - **Tokens**: plain `(event name, id)` values; dropping one removes nothing
//! - **Handles**: RAII wrappers that unsubscribe exactly once
//! - **Observers**: subscribers that leak, clean up, or form a reference cycle
//! - **Harness**: the create / post / release actions of the sample app
//!
//! ## Example
//!
//! ```
//! use notification_lifetimes::{Harness, ObserverContext, TabConfig, Variant};
//!
//! let mut tab = Harness::new(
//!     ObserverContext::default(),
//!     TabConfig::numbered(1, Variant::NeverUnregisters),
//! );
//!
//! let observer = tab.create_next();
//! assert_eq!(tab.post(), 1);
//! tab.release_subscriber(&observer).unwrap();
//!
//! // The registration outlived its observer.
//! assert_eq!(tab.post(), 1);
//! assert_eq!(tab.ledger().entries("Tab_1_Notification", 1), 2);
//! assert_eq!(tab.ledger().deliveries("Tab_1_Notification", 1), 1);
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod harness;
pub mod ledger;
pub mod observers;
pub mod types;

// Re-exports
pub use bus::{AutoUnsubscribingHandle, Callback, NotificationBus};
pub use config::{DemoConfig, TabConfig};
pub use error::{Error, Result};
pub use harness::{Demo, Harness, SubscriberHandle};
pub use ledger::{InvocationKey, InvocationLedger};
pub use observers::{
    HandleWrappedObserver, NeverUnregistersObserver, Observer, ObserverContext, ObserverCore,
    StrongRefObserver, UnregistersOnReleaseObserver, Variant,
};
pub use types::*;
