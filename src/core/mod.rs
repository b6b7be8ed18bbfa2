//! Runtime core: orchestration and lifecycle.
//!
//! Internal modules:
//! - [`container`]: runs one task, isolates panics, reports exactly one outcome;
//! - [`supervisor`]: launches containers, waits for the first trigger, cancels, collects;
//! - [`shutdown`]: trigger channel producers (handle, OS signals);
//! - [`config`], [`builder`]: supervisor construction.

mod builder;
mod config;
mod container;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use shutdown::{ShutdownHandle, ShutdownReason, Signal};
pub use supervisor::Supervisor;
