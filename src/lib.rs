//! # runvisor
//!
//! **runvisor** runs a fixed group of long-lived async tasks (an HTTP server, a
//! background worker, a metrics exporter, ...) that must start together and stop
//! together.
//!
//! The first task to exit, whether it succeeds, fails or panics, or the first
//! external trigger (OS signal, [`ShutdownHandle`]) ends the run: every other task is
//! cancelled through a shared [`CancellationToken`](tokio_util::sync::CancellationToken),
//! the supervisor waits a bounded grace period for them, and a single aggregate
//! result is returned.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │   TaskRef    │   │   TaskRef    │
//!     │(user task #1)│   │(user task #2)│   │(user task #3)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - child CancellationToken (broadcast cancel)                     │
//! │  - trigger channel (bounded mpsc, one slot per task + reserve)    │
//! │  - grace period (one shared deadline)                             │
//! │  - SubscriberSet (diagnostics)                                    │
//! └──────┬──────────────────┬──────────────────┬───────────────▲──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │ ShutdownReason
//!     │  Container   │   │  Container   │   │  Container   │   │ (first one wins)
//!     │ catch_unwind │   │ catch_unwind │   │ catch_unwind │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      └──────────────────┴──────────────────┴─────────────────┤
//!                                  ShutdownHandle / OS signals ┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ─► Running ─► ShuttingDown ─► Drained ─► Done
//!          │           │               │          └─ Err(first error by registration order) / Ok(())
//!          │           │               └─ every container reported or the deadline passed
//!          │           └─ token.cancel(); deadline = now + grace
//!          └─ all containers launched; waiting for the first trigger
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                   |
//! |-------------------|---------------------------------------------------------------|--------------------------------------|
//! | **Tasks**         | Define tasks as trait objects or closures.                    | [`Task`], [`TaskFn`], [`TaskRef`]    |
//! | **Supervision**   | Start together, stop together, one aggregate result.          | [`Supervisor`], [`SupervisorBuilder`]|
//! | **Triggers**      | End the run from outside the task group.                      | [`ShutdownHandle`], [`Signal`]       |
//! | **Diagnostics**   | Lifecycle events for logging or custom sinks.                 | [`Subscribe`], [`Event`], [`LogWriter`] |
//! | **Errors**        | Task failures and caught panics as data.                      | [`TaskError`]                        |
//! | **Configuration** | Grace period and trigger channel sizing.                      | [`SupervisorConfig`]                 |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use runvisor::{Supervisor, SupervisorConfig, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     let sup = Supervisor::builder(SupervisorConfig::default())
//!         .with_task(TaskFn::arc("ticker", |ctx: CancellationToken| async move {
//!             while !ctx.is_cancelled() {
//!                 tokio::time::sleep(Duration::from_millis(10)).await;
//!             }
//!             Ok::<(), TaskError>(())
//!         }))
//!         .build();
//!
//!     // Stop the group from outside after a short while.
//!     let handle = sup.shutdown_handle();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         handle.shutdown("demo over");
//!     });
//!
//!     sup.run(&CancellationToken::new()).await
//! }
//! ```

mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use self::core::{
    ShutdownHandle, ShutdownReason, Signal, Supervisor, SupervisorBuilder, SupervisorConfig,
};
pub use error::TaskError;
pub use events::{Event, EventKind, Level};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{Task, TaskFn, TaskRef};
