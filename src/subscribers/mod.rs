//! # Event subscribers.
//!
//! Subscribers are the diagnostic sink of the supervisor: every [`Event`](crate::Event)
//! of a run is handed to each of them through a [`SubscriberSet`].
//!
//! ## Architecture
//! ```text
//! Supervisor ── emit(&Event) ──► SubscriberSet
//!                                   │
//!                                   ├──► LogWriter::on_event()  (tracing)
//!                                   ├──► Custom::on_event()
//!                                   └──► ...   (panics caught per subscriber)
//! ```
//!
//! ## Implementing custom subscribers
//! ```
//! use runvisor::{Event, EventKind, Subscribe};
//!
//! struct Alerts;
//!
//! impl Subscribe for Alerts {
//!     fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::GraceExceeded {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "alerts" }
//! }
//! ```

mod log;
mod subscribe;
mod subscriber_set;

pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
