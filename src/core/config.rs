//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`], the settings of one supervised run.
//!
//! ## Field semantics
//! - `grace`: total time allowed for **all** tasks to report after cancellation
//!   (`0s` = do not wait; tasks that have not already reported are abandoned)
//! - `trigger_reserve`: extra shutdown-trigger slots for external sources
//!   (signals, [`ShutdownHandle`](crate::ShutdownHandle)) on top of one slot per task

use std::time::Duration;

/// Configuration for a supervised run.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Maximum time to wait, in total, for tasks to stop after cancellation.
    ///
    /// The deadline is computed once when shutdown begins and shared by every task:
    /// a task visited late in the collection phase gets whatever time is left.
    pub grace: Duration,

    /// Number of shutdown-trigger slots reserved for external triggers.
    ///
    /// Only the first trigger of a run is consumed; extra triggers that find the
    /// channel full are dropped, never waited on.
    pub trigger_reserve: usize,
}

impl SupervisorConfig {
    /// Returns the shutdown-trigger channel capacity for `tasks` registered tasks.
    ///
    /// Always at least 1 so the channel can be constructed.
    #[inline]
    pub fn trigger_capacity(&self, tasks: usize) -> usize {
        tasks.saturating_add(self.trigger_reserve).max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `grace = 3s`
    /// - `trigger_reserve = 2`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(3),
            trigger_reserve: 2,
        }
    }
}
