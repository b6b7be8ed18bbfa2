//! # Container: one task, isolated.
//!
//! A [`Container`] wraps exactly one [`Task`](crate::Task) for a whole run and
//! guarantees that exactly **one** outcome is produced, whichever way the task ends.
//!
//! ## Exit paths
//! ```text
//! launch() ──► tokio::spawn ──► catch_unwind(task.run(ctx))
//!                                   │
//!                                   ├─ Ok(())  ─┐
//!                                   ├─ Err(e)  ─┼─► last_error (if Err)
//!                                   └─ panic   ─┘     ├─► outcome channel (oneshot)
//!                                (→ Crashed)          └─► trigger channel (TaskExited)
//! ```
//!
//! ## Rules
//! - A panic never leaves the container: it becomes [`TaskError::Crashed`].
//! - Neither write can block: the outcome channel is a oneshot, the trigger write
//!   uses `try_send`.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::shutdown::{ShutdownHandle, ShutdownReason};
use crate::error::{TaskError, panic_info};
use crate::tasks::TaskRef;

/// Final result of a task.
pub(crate) type Outcome = Result<(), TaskError>;

/// Isolation wrapper around one task's execution and outcome reporting.
pub(crate) struct Container {
    task: TaskRef,
    /// Read side of the outcome channel; set by `launch`, cleared once read.
    outcome: Option<oneshot::Receiver<Outcome>>,
    /// Written by the execution unit, at most once.
    last_error: Arc<OnceLock<TaskError>>,
}

impl Container {
    pub(crate) fn new(task: TaskRef) -> Self {
        Self {
            task,
            outcome: None,
            last_error: Arc::new(OnceLock::new()),
        }
    }

    /// Task name used in diagnostics.
    pub(crate) fn name(&self) -> &str {
        self.task.name()
    }

    /// Starts the task on the runtime.
    ///
    /// Results are only observable through [`wait_until`](Self::wait_until),
    /// [`last_error`](Self::last_error) and the trigger channel behind `shutdown`.
    pub(crate) fn launch(&mut self, ctx: CancellationToken, shutdown: ShutdownHandle) {
        let (tx, rx) = oneshot::channel();
        self.outcome = Some(rx);

        let task = Arc::clone(&self.task);
        let last_error = Arc::clone(&self.last_error);

        tokio::spawn(async move {
            // The call itself is inside the guarded future: a closure that panics
            // before returning its future is caught too.
            let run = async { task.run(ctx).await };
            let outcome = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(res) => res,
                Err(panic_err) => Err(TaskError::Crashed {
                    task: task.name().to_string(),
                    info: panic_info(panic_err.as_ref()),
                }),
            };

            if let Err(err) = &outcome {
                let _ = last_error.set(err.clone());
            }
            let reason = ShutdownReason::TaskExited {
                task: task.name().into(),
                error: outcome.as_ref().err().cloned(),
            };
            let _ = tx.send(outcome);
            shutdown.trigger(reason);
        });
    }

    /// Waits for the outcome, but not past `deadline`.
    ///
    /// An outcome that is already available is returned even when `deadline` has
    /// passed. Returns `None` if the deadline is reached first, if the container was
    /// never launched, or if the outcome was already taken.
    pub(crate) async fn wait_until(&mut self, deadline: Instant) -> Option<Outcome> {
        let rx = self.outcome.as_mut()?;
        match time::timeout_at(deadline, rx).await {
            Ok(Ok(outcome)) => {
                self.outcome = None;
                Some(outcome)
            }
            // execution unit dropped without reporting (runtime shutting down)
            Ok(Err(_closed)) => {
                self.outcome = None;
                None
            }
            Err(_elapsed) => None,
        }
    }

    /// The error recorded by the task, if it has terminated with one.
    pub(crate) fn last_error(&self) -> Option<TaskError> {
        self.last_error.get().cloned()
    }
}
