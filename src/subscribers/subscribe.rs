//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! runtime.
//!
//! ## Contract
//! - `on_event` is called inline on the supervisor's path: it must return quickly
//!   (hand the event off to a channel if real I/O is needed).
//! - A panic inside `on_event` is caught by the [`SubscriberSet`](crate::SubscriberSet)
//!   and never reaches the supervisor.

use crate::events::Event;

/// Contract for event subscribers.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
