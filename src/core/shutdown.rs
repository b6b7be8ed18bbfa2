//! # Shutdown triggers.
//!
//! Every source that can end the running phase writes one [`ShutdownReason`] into the
//! supervisor's bounded trigger channel:
//! ```text
//! Container (task returned / panicked) ──┐
//! ShutdownHandle::shutdown(reason)     ──┼──► try_send ──► [trigger channel] ──► Supervisor (reads one)
//! OS signal listener                   ──┘
//! ```
//!
//! ## Rules
//! - Producers never block: writes use `try_send`, a full channel drops the trigger.
//! - The supervisor consumes exactly one trigger per run; the rest stay buffered.
//!
//! ## Signals
//! **Unix platforms:** any of [`Signal`] (`SIGINT`, `SIGTERM`, `SIGQUIT`, `SIGHUP`);
//! defaults to `SIGINT` + `SIGTERM`.
//!
//! **Other platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`], whatever is requested.

use std::{fmt, io, sync::Arc};

use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tracing::debug;

use crate::error::TaskError;

/// Text used for a task that returned without an error.
pub(crate) const STOPPED_CLEANLY: &str = "stopped cleanly";

/// Why the running phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A task returned or panicked.
    TaskExited {
        /// Name of the task.
        task: Arc<str>,
        /// Its error, `None` for a clean return.
        error: Option<TaskError>,
    },
    /// An OS termination signal was received.
    Signal(Signal),
    /// Shutdown was requested through a [`ShutdownHandle`].
    Requested(String),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::TaskExited { task, error: None } => {
                write!(f, "{task}: {STOPPED_CLEANLY}")
            }
            // a crash already names its task
            ShutdownReason::TaskExited {
                error: Some(err @ TaskError::Crashed { .. }),
                ..
            } => write!(f, "{err}"),
            ShutdownReason::TaskExited {
                task,
                error: Some(err),
            } => write!(f, "{task}: {err}"),
            ShutdownReason::Signal(sig) => write!(f, "received signal {sig}"),
            ShutdownReason::Requested(reason) => f.write_str(reason),
        }
    }
}

/// Termination signals that can trigger shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// `SIGINT` (Ctrl-C in terminal).
    Interrupt,
    /// `SIGTERM` (default kill signal, used by systemd/Kubernetes).
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `SIGHUP`.
    Hangup,
}

impl Signal {
    /// Signals listened to when none are specified.
    pub const DEFAULT: [Signal; 2] = [Signal::Interrupt, Signal::Terminate];

    /// Conventional signal name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
            Signal::Hangup => "SIGHUP",
        }
    }

    #[cfg(unix)]
    fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            Signal::Interrupt => SignalKind::interrupt(),
            Signal::Terminate => SignalKind::terminate(),
            Signal::Quit => SignalKind::quit(),
            Signal::Hangup => SignalKind::hangup(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cloneable producer side of a supervisor's trigger channel.
///
/// Obtained with [`Supervisor::shutdown_handle`](crate::Supervisor::shutdown_handle)
/// before the run starts; usable from any task or thread.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    tx: mpsc::Sender<ShutdownReason>,
}

impl ShutdownHandle {
    pub(crate) fn new(tx: mpsc::Sender<ShutdownReason>) -> Self {
        Self { tx }
    }

    /// Requests shutdown of the supervised group.
    ///
    /// Returns `true` if the request was queued. A `false` return means the
    /// supervisor already has more triggers than it will ever read, or is gone.
    pub fn shutdown(&self, reason: impl Into<String>) -> bool {
        self.trigger(ShutdownReason::Requested(reason.into()))
    }

    /// Writes a trigger without blocking.
    pub(crate) fn trigger(&self, reason: ShutdownReason) -> bool {
        match self.tx.try_send(reason) {
            Ok(()) => true,
            Err(TrySendError::Full(reason)) => {
                debug!(%reason, "shutdown trigger dropped: channel full");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Registers `signals` and spawns a listener that triggers shutdown on the first one.
///
/// An empty slice means [`Signal::DEFAULT`]. Registration errors are returned
/// before anything is spawned. Must be called within a tokio runtime.
#[cfg(unix)]
pub(crate) fn spawn_signal_listener(
    signals: &[Signal],
    handle: ShutdownHandle,
) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::signal;

    let signals: &[Signal] = if signals.is_empty() {
        &Signal::DEFAULT
    } else {
        signals
    };

    let mut streams = Vec::with_capacity(signals.len());
    for &sig in signals {
        streams.push((sig, signal(sig.kind())?));
    }

    Ok(tokio::spawn(async move {
        let waits = streams.into_iter().map(|(sig, mut stream)| {
            Box::pin(async move {
                stream.recv().await;
                sig
            })
        });
        let (sig, _, _) = futures::future::select_all(waits).await;
        debug!(signal = %sig, "termination signal received");
        handle.trigger(ShutdownReason::Signal(sig));
    }))
}

/// Registers `signals` and spawns a listener that triggers shutdown on the first one.
///
/// Only Ctrl-C is observable here; it is reported as [`Signal::Interrupt`].
#[cfg(not(unix))]
pub(crate) fn spawn_signal_listener(
    _signals: &[Signal],
    handle: ShutdownHandle,
) -> io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.trigger(ShutdownReason::Signal(Signal::Interrupt));
        }
    }))
}
