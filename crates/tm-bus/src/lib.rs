//! `tm-bus` — in-process publish/subscribe channel.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`bus`]    | `EventBus<M>`, `BusConfig`                                |
//! | [`handle`] | `SubscriptionId`, the unsubscribe token                    |
//!
//! # Semantics
//!
//! - Topics are created on first use (publish or subscribe); nothing here
//!   returns an error.
//! - Every topic keeps a bounded FIFO of its most recent messages.  The
//!   capacity defaults to [`BusConfig::history`] and can be changed per topic.
//! - `publish` appends to history and then invokes the topic's subscribers
//!   synchronously, in subscription order.
//! - Subscription handles are opaque ids, never positions, so removing one
//!   subscriber cannot invalidate another's handle.
//!
//! # Example
//!
//! ```rust
//! use tm_bus::EventBus;
//!
//! let mut bus: EventBus<u32> = EventBus::new(3);
//! let id = bus.subscribe("counts", |n: &u32| assert!(*n > 0));
//! for n in 1..=5 {
//!     bus.publish("counts", n);
//! }
//! assert_eq!(bus.messages("counts", None), vec![&3u32, &4, &5]);
//! assert!(bus.unsubscribe("counts", id));
//! assert!(!bus.unsubscribe("counts", id));
//! ```

pub mod bus;
pub mod handle;

#[cfg(test)]
mod tests;

pub use bus::{BusConfig, EventBus};
pub use handle::SubscriptionId;
