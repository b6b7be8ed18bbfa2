//! # Runtime events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies events along the run of a supervisor:
//! ```text
//! TaskStarting × N ─► SupervisorRunning ─► ShutdownRequested ─► GraceStarted
//!     ─► (TaskStopped | GraceExceeded) × N ─► RunFinished
//! ```
//!
//! The [`Event`] struct carries optional metadata: task name, reason text, grace period.
//!
//! ## Example
//! ```rust
//! use runvisor::{Event, EventKind, Level};
//!
//! let ev = Event::new(EventKind::GraceExceeded).with_task("exporter");
//!
//! assert_eq!(ev.kind, EventKind::GraceExceeded);
//! assert_eq!(ev.task.as_deref(), Some("exporter"));
//! assert_eq!(ev.level(), Level::Warn);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Severity of an event for log-oriented subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Normal lifecycle step.
    Info,
    /// A task was abandoned or the run ended with an error.
    Warn,
}

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Task was launched.
    ///
    /// Sets:
    /// - `task`: task name
    TaskStarting,

    /// Every task was launched; the supervisor waits for a shutdown trigger.
    SupervisorRunning,

    /// First shutdown trigger received; cancellation is broadcast right after.
    ///
    /// Sets:
    /// - `reason`: rendered [`ShutdownReason`](crate::ShutdownReason)
    ShutdownRequested,

    /// Collection of task outcomes started.
    ///
    /// Sets:
    /// - `grace`: total time allowed for all tasks to stop
    GraceStarted,

    /// Task reported its outcome within the grace period.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: error text, or `stopped cleanly`
    TaskStopped,

    /// Task did not report before the grace deadline and is abandoned.
    ///
    /// Sets:
    /// - `task`: task name
    GraceExceeded,

    /// Run is over.
    ///
    /// Sets:
    /// - `reason`: the aggregate error text, absent on success
    RunFinished,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (shutdown reason, task outcome, final error).
    pub reason: Option<Arc<str>>,
    /// Grace period of the run.
    pub grace: Option<Duration>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            grace: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the grace period.
    #[inline]
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = Some(grace);
        self
    }

    /// Returns the severity of this event.
    ///
    /// Only a task abandoned after the grace period and a run ending with an error
    /// are warnings.
    pub fn level(&self) -> Level {
        match self.kind {
            EventKind::GraceExceeded => Level::Warn,
            EventKind::RunFinished if self.reason.is_some() => Level::Warn,
            _ => Level::Info,
        }
    }
}
