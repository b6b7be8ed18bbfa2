//! Runtime events emitted by the supervisor.
//!
//! Every lifecycle step of a run (task launched, shutdown triggered, task stopped,
//! grace period exceeded, run finished) is described by an [`Event`] and handed to the
//! supervisor's [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Level`] severity used by log-oriented subscribers

mod event;

pub use event::{Event, EventKind, Level};
