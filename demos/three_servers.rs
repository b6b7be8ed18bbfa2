//! # Example: three_servers
//!
//! Runs three misbehaving "servers" under one supervisor:
//! - `server`: cooperative, stops on cancellation (or gives up on its own after `--deadline`);
//! - `hung`: ignores cancellation and is abandoned after the grace period;
//! - `panicky`: panics after one second, which triggers the shutdown.
//!
//! ## Flow
//! ```text
//! t=0s  all three started
//! t=1s  panicky panics ─► Crashed ─► shutdown requested ─► token cancelled
//!       server stops cleanly; hung keeps running
//! t=4s  grace (3s) exceeded for hung ─► exit code 1
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example three_servers
//! ```

use std::process::ExitCode;
use std::time::Duration;

use async_trait::async_trait;
use runvisor::{Supervisor, SupervisorConfig, Task, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Serves until cancelled; with a deadline, gives up with an error instead.
struct Server {
    deadline: Option<Duration>,
}

impl Server {
    async fn serve(&self, ctx: CancellationToken) -> anyhow::Result<()> {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = ctx.cancelled() => Ok(()),
                    _ = tokio::time::sleep(deadline) => anyhow::bail!("sepuku after {deadline:?}"),
                }
            }
            None => {
                ctx.cancelled().await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Task for Server {
    fn name(&self) -> &str {
        "server"
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        self.serve(ctx).await.map_err(TaskError::fail)
    }
}

fn hung() -> TaskRef {
    TaskFn::arc("hung", |_ctx: CancellationToken| async {
        std::future::pending::<()>().await;
        Ok::<(), TaskError>(())
    })
}

fn panicky() -> TaskRef {
    TaskFn::arc("panicky", |_ctx: CancellationToken| async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        if true {
            panic!("yooooolooooooo");
        }
        Ok::<(), TaskError>(())
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let deadline = std::env::args()
        .skip_while(|arg| arg != "--deadline")
        .nth(1)
        .and_then(|secs| secs.parse().ok())
        .map(Duration::from_secs);

    Supervisor::builder(SupervisorConfig::default())
        .with_task(std::sync::Arc::new(Server { deadline }))
        .with_task(hung())
        .with_task(panicky())
        .build()
        .run_until_signal()
        .await
}
