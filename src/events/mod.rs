//! Change notification bus
//!
//! Writers publish a [`Topic`] after a command commits; views subscribe and
//! re-query the store. There is no payload and no persistence: a notification
//! only says "this kind of data changed".
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gestion::events::{EventBus, Topic};
//!
//! let bus = Arc::new(EventBus::new());
//! let handle = bus.subscribe(Topic::Expenses, |topic| println!("{} changed", topic));
//! bus.publish(Topic::Expenses);
//! bus.unsubscribe(handle);
//! ```

mod bus;
mod topic;

pub use bus::{EventBus, SubscriptionHandle};
pub use topic::Topic;
