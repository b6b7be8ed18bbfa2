//! # LogWriter: events rendered through `tracing`
//!
//! The default subscriber of a [`Supervisor`](crate::Supervisor). Install a
//! `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see its output.
//!
//! ## Example output
//! ```text
//! INFO task started task="http"
//! INFO all tasks running
//! INFO shutdown requested reason="worker: connection refused"
//! INFO waiting for tasks to stop grace=3s
//! INFO task stopped task="http" outcome="stopped cleanly"
//! WARN task did not stop during the grace period task="exporter"
//! WARN run finished with an error error="connection refused"
//! ```

use tracing::{info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn message_for(kind: EventKind) -> &'static str {
    match kind {
        EventKind::TaskStarting => "task started",
        EventKind::SupervisorRunning => "all tasks running",
        EventKind::ShutdownRequested => "shutdown requested",
        EventKind::GraceStarted => "waiting for tasks to stop",
        EventKind::TaskStopped => "task stopped",
        EventKind::GraceExceeded => "task did not stop during the grace period",
        EventKind::RunFinished => "run finished",
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let msg = message_for(e.kind);
        let task = e.task.as_deref().unwrap_or("unknown");
        let reason = e.reason.as_deref().unwrap_or("unknown");

        match e.kind {
            EventKind::TaskStarting => info!(task, "{msg}"),
            EventKind::SupervisorRunning => info!("{msg}"),
            EventKind::ShutdownRequested => info!(reason, "{msg}"),
            EventKind::GraceStarted => info!(grace = ?e.grace.unwrap_or_default(), "{msg}"),
            EventKind::TaskStopped => info!(task, outcome = reason, "{msg}"),
            EventKind::GraceExceeded => warn!(task, "{msg}"),
            EventKind::RunFinished => match e.reason.as_deref() {
                Some(error) => warn!(error, "run finished with an error"),
                None => info!("{msg}"),
            },
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
