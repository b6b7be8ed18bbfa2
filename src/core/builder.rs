use std::sync::Arc;
use std::time::Duration;

use crate::{
    core::{config::SupervisorConfig, supervisor::Supervisor},
    subscribers::{LogWriter, Subscribe},
    tasks::TaskRef,
};

/// Builder for constructing a [`Supervisor`].
///
/// Without [`with_subscribers`](Self::with_subscribers), events go to a [`LogWriter`].
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    tasks: Vec<TaskRef>,
    subscribers: Option<Vec<Arc<dyn Subscribe>>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            tasks: Vec::new(),
            subscribers: None,
        }
    }

    /// Registers one task. Registration order is launch and error-reporting order.
    pub fn with_task(mut self, task: TaskRef) -> Self {
        self.tasks.push(task);
        self
    }

    /// Registers several tasks, after any already registered.
    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = TaskRef>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Replaces the default [`LogWriter`] with the given subscribers.
    ///
    /// An empty list silences diagnostics.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = Some(subscribers);
        self
    }

    /// Overrides the configured grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.cfg.grace = grace;
        self
    }

    /// Builds the supervisor.
    pub fn build(self) -> Supervisor {
        let subscribers = self
            .subscribers
            .unwrap_or_else(|| vec![Arc::new(LogWriter::new())]);
        Supervisor::new(self.cfg, self.tasks, subscribers)
    }
}
