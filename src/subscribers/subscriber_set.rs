//! # Panic-isolated fan-out to multiple subscribers.
//!
//! [`SubscriberSet`] hands each event to every subscriber in registration order.
//!
//! ## Rules
//! - **Synchronous**: `emit()` returns once every subscriber has seen the event.
//! - **Isolation**: a panicking subscriber is logged and skipped; the remaining
//!   subscribers and the supervisor are unaffected.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::error;

use crate::error::panic_info;
use crate::events::Event;
use crate::subscribers::Subscribe;

/// Ordered set of subscribers sharing one emit call.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Delivers `event` to every subscriber.
    pub fn emit(&self, event: &Event) {
        for sub in &self.subs {
            if let Err(panic_err) = catch_unwind(AssertUnwindSafe(|| sub.on_event(event))) {
                error!(
                    subscriber = sub.name(),
                    reason = %panic_info(panic_err.as_ref()),
                    "subscriber panicked while processing an event"
                );
            }
        }
    }

    /// Number of subscribers in the set.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Returns `true` if the set holds no subscriber.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}
