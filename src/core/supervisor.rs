//! # Supervisor: start together, stop together.
//!
//! The [`Supervisor`] owns one [`Container`] per registered task, the shared
//! shutdown-trigger channel, the grace period and the [`SubscriberSet`].
//!
//! ## High-level architecture
//! ```text
//! Idle
//!   └─► run(parent)
//!         ├─► token = parent.child_token()
//!         ├─► Container[0..N].launch(token, trigger)        (registration order)
//! Running
//!         ├─► trigger_rx.recv()    ◄── first of: task exit / ShutdownHandle / OS signal
//! ShuttingDown
//!         ├─► token.cancel()                                (broadcast)
//!         ├─► deadline = now + grace (saturating)           (computed once)
//!         └─► for c in containers:  c.wait_until(deadline)
//!                ├─ Some(outcome) → TaskStopped
//!                └─ None          → GraceExceeded (abandoned, not awaited again)
//! Drained
//!         └─► first last_error in registration order, else Ok(())
//! Done
//! ```
//!
//! ## Rules
//! - The first trigger (wall clock) decides the shutdown **reason**; the returned error
//!   is chosen by **registration order**, so it may come from a different task.
//! - The grace period bounds the **whole** collection phase, not each task.
//! - The returned error is always a task's error; the supervisor adds none of its own.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use runvisor::{Supervisor, SupervisorConfig, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sup = Supervisor::builder(SupervisorConfig::default())
//!         .with_grace(Duration::from_secs(1))
//!         .with_task(TaskFn::arc("server", |ctx: CancellationToken| async move {
//!             ctx.cancelled().await;
//!             Ok::<(), TaskError>(())
//!         }))
//!         .with_task(TaskFn::arc("migrations", |_ctx: CancellationToken| async {
//!             Err::<(), _>(TaskError::fail("schema mismatch"))
//!         }))
//!         .build();
//!
//!     let res = sup.run(&CancellationToken::new()).await;
//!     assert_eq!(res, Err(TaskError::fail("schema mismatch")));
//! }
//! ```

use std::{io, process::ExitCode, sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::{
    builder::SupervisorBuilder,
    config::SupervisorConfig,
    container::Container,
    shutdown::{self, STOPPED_CLEANLY, ShutdownHandle, ShutdownReason, Signal},
};
use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::TaskRef;

/// Stand-in for "never" when `now + grace` does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    ShuttingDown,
    Drained,
    Done,
}

/// Runs a fixed group of tasks and shuts them down together.
///
/// A supervisor is single-use: [`run`](Supervisor::run) consumes it, so running the
/// same instance twice is rejected at compile time.
///
/// ```compile_fail
/// # async fn twice(sup: runvisor::Supervisor) {
/// let token = tokio_util::sync::CancellationToken::new();
/// let _ = sup.run(&token).await;
/// let _ = sup.run(&token).await; // use of moved value: `sup`
/// # }
/// ```
pub struct Supervisor {
    cfg: SupervisorConfig,
    containers: Vec<Container>,
    trigger_tx: mpsc::Sender<ShutdownReason>,
    trigger_rx: mpsc::Receiver<ShutdownReason>,
    subs: SubscriberSet,
    state: State,
}

impl Supervisor {
    /// Creates a builder with the given configuration.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// Creates a supervisor for `tasks`, reporting to `subscribers`.
    ///
    /// Tasks are launched, awaited and scanned for errors in the order given here.
    pub fn new(
        cfg: SupervisorConfig,
        tasks: Vec<TaskRef>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let (trigger_tx, trigger_rx) = mpsc::channel(cfg.trigger_capacity(tasks.len()));
        let containers = tasks.into_iter().map(Container::new).collect();

        Self {
            cfg,
            containers,
            trigger_tx,
            trigger_rx,
            subs: SubscriberSet::new(subscribers),
            state: State::Idle,
        }
    }

    /// Returns a handle that can end the running phase from outside.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(self.trigger_tx.clone())
    }

    /// Triggers shutdown on the first of `signals` (empty = `SIGINT` + `SIGTERM`).
    ///
    /// The listener outlives the run if no signal arrives; abort the returned handle
    /// once the run is over. Must be called within a tokio runtime.
    ///
    /// Registering a signal installs tokio's process-wide handler for it, and aborting
    /// the listener does not uninstall it: for the rest of the process lifetime those
    /// signals are caught rather than terminating the process with the default action.
    pub fn install_signal_handler(&self, signals: &[Signal]) -> io::Result<JoinHandle<()>> {
        shutdown::spawn_signal_listener(signals, self.shutdown_handle())
    }

    /// Grace period of this supervisor.
    pub fn grace(&self) -> Duration {
        self.cfg.grace
    }

    /// Names of the registered tasks, in registration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(Container::name)
    }

    /// Runs every task until the first one exits or an external trigger fires,
    /// then cancels the rest and collects their outcomes within the grace period.
    ///
    /// Returns the error of the first task (registration order) that recorded one,
    /// or `Ok(())` if every task that reported exited cleanly. With no tasks
    /// registered, returns `Ok(())` immediately.
    pub async fn run(mut self, parent: &CancellationToken) -> Result<(), TaskError> {
        if self.containers.is_empty() {
            self.transition(State::Done);
            self.subs.emit(&Event::new(EventKind::RunFinished));
            return Ok(());
        }

        let token = parent.child_token();
        self.launch_all(&token);
        self.transition(State::Running);
        self.subs.emit(&Event::new(EventKind::SupervisorRunning));

        let reason = self.wait_trigger().await;
        self.transition(State::ShuttingDown);
        self.subs
            .emit(&Event::new(EventKind::ShutdownRequested).with_reason(reason.to_string()));
        token.cancel();

        self.collect_with_grace().await;
        self.transition(State::Drained);

        let res = self.first_error().map_or(Ok(()), Err);
        self.transition(State::Done);

        let finished = match &res {
            Ok(()) => Event::new(EventKind::RunFinished),
            Err(err) => Event::new(EventKind::RunFinished).with_reason(err.to_string()),
        };
        self.subs.emit(&finished);
        res
    }

    /// Runs with a fresh root token and the default signal handler installed,
    /// mapping the result to a process exit status.
    ///
    /// The final error, if any, is reported through the subscribers
    /// ([`EventKind::RunFinished`]). `SIGINT` and `SIGTERM` stay caught after this
    /// returns; see [`install_signal_handler`](Supervisor::install_signal_handler).
    ///
    /// ```no_run
    /// use std::process::ExitCode;
    /// use runvisor::{Supervisor, SupervisorConfig, TaskRef};
    ///
    /// # fn http() -> TaskRef { unimplemented!() }
    /// # fn worker() -> TaskRef { unimplemented!() }
    /// #[tokio::main]
    /// async fn main() -> ExitCode {
    ///     Supervisor::builder(SupervisorConfig::default())
    ///         .with_task(http())
    ///         .with_task(worker())
    ///         .build()
    ///         .run_until_signal()
    ///         .await
    /// }
    /// ```
    pub async fn run_until_signal(self) -> ExitCode {
        let listener = match self.install_signal_handler(&[]) {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!(error = %e, "failed to install signal handler; running without it");
                None
            }
        };

        let res = self.run(&CancellationToken::new()).await;
        if let Some(listener) = listener {
            listener.abort();
        }

        match res {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        }
    }

    /// Launches every container under `token`, in registration order.
    fn launch_all(&mut self, token: &CancellationToken) {
        for c in &mut self.containers {
            c.launch(token.clone(), ShutdownHandle::new(self.trigger_tx.clone()));
            self.subs
                .emit(&Event::new(EventKind::TaskStarting).with_task(c.name()));
        }
    }

    /// Waits for the first shutdown trigger.
    async fn wait_trigger(&mut self) -> ShutdownReason {
        // `trigger_tx` lives in `self`, so the channel cannot close while we wait.
        match self.trigger_rx.recv().await {
            Some(reason) => reason,
            None => ShutdownReason::Requested("trigger channel closed".to_string()),
        }
    }

    /// Collects outcomes in registration order against a single shared deadline.
    async fn collect_with_grace(&mut self) {
        let grace = self.cfg.grace;
        self.subs
            .emit(&Event::new(EventKind::GraceStarted).with_grace(grace));

        let deadline = deadline_after(grace);
        for c in &mut self.containers {
            let ev = match c.wait_until(deadline).await {
                Some(Ok(())) => Event::new(EventKind::TaskStopped)
                    .with_task(c.name())
                    .with_reason(STOPPED_CLEANLY),
                Some(Err(err)) => Event::new(EventKind::TaskStopped)
                    .with_task(c.name())
                    .with_reason(err.to_string()),
                None => Event::new(EventKind::GraceExceeded).with_task(c.name()),
            };
            self.subs.emit(&ev);
        }
    }

    /// First recorded error, in registration order.
    fn first_error(&self) -> Option<TaskError> {
        self.containers.iter().find_map(Container::last_error)
    }

    fn transition(&mut self, next: State) {
        debug!(from = ?self.state, to = ?next, "supervisor state transition");
        self.state = next;
    }
}

/// Absolute deadline `grace` from now, saturating to [`FAR_FUTURE`].
fn deadline_after(grace: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(grace).unwrap_or(now + FAR_FUTURE)
}
