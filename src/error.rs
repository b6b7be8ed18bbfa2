//! Error types produced by supervised tasks.
//!
//! [`TaskError`] is the only error the runtime ever returns: the supervisor has no
//! failure mode of its own, it only propagates what its tasks reported.
//!
//! - [`TaskError::Fail`] a task returned an error from [`Task::run`](crate::Task::run);
//! - [`TaskError::Crashed`] a task panicked and the panic was caught at its container.
//!
//! A task that ignores cancellation past the grace period is **not** an error value;
//! it is reported as an [`EventKind::GraceExceeded`](crate::EventKind::GraceExceeded) warning.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// # Errors produced by task execution.
///
/// Values are cheap to clone: one copy is kept as the container's last error,
/// another travels through the container's outcome channel.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task returned an error.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The task panicked while running.
    #[error("{task}: panic: {info}")]
    Crashed {
        /// Name of the task that panicked.
        task: String,
        /// Panic payload rendered as text.
        info: String,
    },
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use runvisor::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn fail(error: impl fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use runvisor::TaskError;
    ///
    /// let err = TaskError::Crashed { task: "api".into(), info: "oops".into() };
    /// assert_eq!(err.as_label(), "task_crashed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Crashed { .. } => "task_crashed",
        }
    }

    /// Returns `true` if the task terminated by panicking.
    pub fn is_crash(&self) -> bool {
        matches!(self, TaskError::Crashed { .. })
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::fail(err)
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
