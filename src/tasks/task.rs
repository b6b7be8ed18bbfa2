//! # Task abstraction.
//!
//! A [`Task`] is a long-running unit of work registered with the
//! [`Supervisor`](crate::Supervisor). It receives a [`CancellationToken`] and must
//! return promptly once the token is cancelled.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// # Shared handle to a task object.
///
/// This is the type the supervisor stores for every registered task.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit.
///
/// A `Task` has a stable [`name`](Task::name), used only for diagnostics, and an async
/// [`run`](Task::run) method that receives a [`CancellationToken`].
///
/// A task may run until it is told to stop, or return on its own at any time: the first
/// task to return (with or without an error) triggers shutdown of the whole group.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use runvisor::{Task, TaskError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Task for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         loop {
///             tokio::select! {
///                 _ = ctx.cancelled() => return Ok(()),
///                 _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {
///                     // beat...
///                 }
///             }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Runs the task until it finishes or `ctx` is cancelled.
    ///
    /// Implementations must observe `ctx` and return quickly once it is cancelled;
    /// a task still running when the grace period ends is abandoned.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
