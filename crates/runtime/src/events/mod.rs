//! Notification system.
//!
//! Events are published synchronously to handlers registered per
//! [`EventKind`], per [`Topic`], or for everything. Async consumers may also
//! read a broadcast stream of the same events.

mod bus;
mod types;

pub use bus::{EventBus, EventHandler, SubscriptionId};
pub use types::{BattleEvent, EventKind, Topic};
