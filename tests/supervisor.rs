use std::sync::atomic::{AtomicBool, Ordering};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use runvisor::{
    Event, EventKind, Level, Subscribe, Supervisor, SupervisorConfig, Task, TaskError, TaskFn,
    TaskRef,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Blocks until cancelled, or fails right away when `fail_with` is set.
#[derive(Default)]
struct Sentinel {
    name: &'static str,
    fail_with: Option<TaskError>,
    started: AtomicBool,
    cancelled: AtomicBool,
}

impl Sentinel {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            ..Default::default()
        })
    }

    fn failing(name: &'static str, err: TaskError) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail_with: Some(err),
            ..Default::default()
        })
    }

    fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Task for Sentinel {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.started.store(true, Ordering::SeqCst);
        ctx.cancelled().await;
        self.cancelled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Ignores cancellation entirely.
fn stubborn(name: &'static str) -> TaskRef {
    TaskFn::arc(name, |_ctx: CancellationToken| async {
        std::future::pending::<()>().await;
        Ok::<(), TaskError>(())
    })
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Event>>);

impl Recorder {
    fn kinds(&self) -> Vec<EventKind> {
        self.0.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    fn tasks_with(&self, kind: EventKind) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .filter_map(|e| e.task.as_deref().map(str::to_string))
            .collect()
    }

    fn reason_of(&self, kind: EventKind) -> Option<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.kind == kind)
            .and_then(|e| e.reason.as_deref().map(str::to_string))
    }
}

impl Subscribe for Recorder {
    fn on_event(&self, event: &Event) {
        self.0.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

fn supervisor(tasks: Vec<TaskRef>, grace: Duration) -> (Supervisor, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_grace(grace)
        .with_tasks(tasks)
        .with_subscribers(vec![recorder.clone()])
        .build();
    (sup, recorder)
}

#[tokio::test]
async fn parent_cancellation_stops_every_task_cleanly() {
    let sentinels = [Sentinel::new("a"), Sentinel::new("b"), Sentinel::new("c")];
    let tasks = sentinels.iter().map(|p| p.clone() as TaskRef).collect();
    let (sup, _) = supervisor(tasks, Duration::from_secs(3));

    let parent = CancellationToken::new();
    let run = tokio::spawn({
        let parent = parent.clone();
        async move { sup.run(&parent).await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    parent.cancel();

    assert_eq!(run.await.unwrap(), Ok(()));
    for p in &sentinels {
        assert!(p.started(), "{} never started", p.name);
        assert!(p.cancelled(), "{} never saw cancellation", p.name);
    }
}

#[tokio::test]
async fn failing_task_cancels_siblings_and_is_returned() {
    let a = Sentinel::new("a");
    let b = Sentinel::failing("b", TaskError::fail("boom"));
    let (sup, events) = supervisor(vec![a.clone(), b], Duration::from_secs(3));

    let res = sup.run(&CancellationToken::new()).await;

    assert_eq!(res, Err(TaskError::fail("boom")));
    assert_eq!(res.unwrap_err().to_string(), "boom");
    assert!(a.cancelled());
    assert_eq!(
        events.reason_of(EventKind::ShutdownRequested).as_deref(),
        Some("b: boom")
    );
}

#[tokio::test]
async fn aggregate_error_follows_registration_order_not_trigger_order() {
    // `flusher` only fails once cancelled; `loader` fails first and triggers shutdown.
    let flusher = TaskFn::arc("flusher", |ctx: CancellationToken| async move {
        ctx.cancelled().await;
        Err::<(), _>(TaskError::fail("interrupted mid-flush"))
    });
    let loader = Sentinel::failing("loader", TaskError::fail("bad config"));
    let (sup, events) = supervisor(vec![flusher, loader], Duration::from_secs(3));

    let res = sup.run(&CancellationToken::new()).await;

    assert_eq!(res, Err(TaskError::fail("interrupted mid-flush")));
    assert_eq!(
        events.reason_of(EventKind::ShutdownRequested).as_deref(),
        Some("loader: bad config")
    );
}

#[tokio::test]
async fn clean_exit_of_one_task_stops_the_group() {
    let server = Sentinel::new("server");
    let oneshot = TaskFn::arc("oneshot", |_ctx: CancellationToken| async {
        Ok::<(), TaskError>(())
    });
    let (sup, events) = supervisor(vec![server.clone(), oneshot], Duration::from_secs(3));

    assert_eq!(sup.run(&CancellationToken::new()).await, Ok(()));
    assert!(server.cancelled());
    assert_eq!(
        events.reason_of(EventKind::ShutdownRequested).as_deref(),
        Some("oneshot: stopped cleanly")
    );
}

#[tokio::test(start_paused = true)]
async fn panic_is_isolated_and_reported_as_crash() {
    let panicky = TaskFn::arc("panicky", |_ctx: CancellationToken| async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        if true {
            panic!("yooooolooooooo");
        }
        Ok::<(), TaskError>(())
    });
    let sibling = Sentinel::new("sibling");
    let grace = Duration::from_secs(3);
    let (sup, events) = supervisor(vec![panicky, stubborn("frozen"), sibling.clone()], grace);

    let start = Instant::now();
    let res = sup.run(&CancellationToken::new()).await;
    let elapsed = start.elapsed();

    assert_eq!(
        res,
        Err(TaskError::Crashed {
            task: "panicky".into(),
            info: "yooooolooooooo".into(),
        })
    );
    assert!(sibling.cancelled());
    assert!(elapsed >= Duration::from_secs(1) + grace);
    assert!(elapsed < Duration::from_secs(2) + grace);
    assert_eq!(events.tasks_with(EventKind::GraceExceeded), ["frozen"]);
}

#[tokio::test(start_paused = true)]
async fn grace_period_bounds_the_whole_collection() {
    let trigger = Sentinel::failing("trigger", TaskError::fail("stop"));
    let grace = Duration::from_secs(2);
    let (sup, events) = supervisor(
        vec![stubborn("s1"), stubborn("s2"), stubborn("s3"), trigger],
        grace,
    );

    let start = Instant::now();
    let res = sup.run(&CancellationToken::new()).await;
    let elapsed = start.elapsed();

    assert_eq!(res, Err(TaskError::fail("stop")));
    // one shared deadline: not 3 × grace
    assert!(elapsed >= grace);
    assert!(elapsed < grace * 2);
    assert_eq!(events.tasks_with(EventKind::GraceExceeded), ["s1", "s2", "s3"]);
    assert_eq!(events.tasks_with(EventKind::TaskStopped), ["trigger"]);
}

#[tokio::test(start_paused = true)]
async fn zero_grace_abandons_tasks_still_running() {
    let cooperative = Sentinel::new("cooperative");
    let trigger = Sentinel::failing("trigger", TaskError::fail("stop"));
    let (sup, events) = supervisor(vec![stubborn("stuck"), cooperative, trigger], Duration::ZERO);

    let res = sup.run(&CancellationToken::new()).await;

    assert_eq!(res, Err(TaskError::fail("stop")));
    let exceeded = events.tasks_with(EventKind::GraceExceeded);
    assert!(exceeded.contains(&"stuck".to_string()));
}

#[tokio::test]
async fn shutdown_handle_ends_the_run() {
    let a = Sentinel::new("a");
    let b = Sentinel::new("b");
    let (sup, events) = supervisor(vec![a.clone(), b.clone()], Duration::from_secs(3));

    // buffered until the supervisor starts reading
    assert!(sup.shutdown_handle().shutdown("deploy"));

    assert_eq!(sup.run(&CancellationToken::new()).await, Ok(()));
    assert!(a.cancelled() && b.cancelled());
    assert_eq!(
        events.reason_of(EventKind::ShutdownRequested).as_deref(),
        Some("deploy")
    );
}

#[tokio::test]
async fn shutdown_handle_outliving_the_run_is_harmless() {
    let (sup, _) = supervisor(vec![Sentinel::new("a")], Duration::from_secs(3));
    let handle = sup.shutdown_handle();

    assert!(handle.shutdown("first"));
    assert_eq!(sup.run(&CancellationToken::new()).await, Ok(()));
    assert!(!handle.shutdown("after the supervisor is gone"));
}

#[tokio::test]
async fn no_tasks_finishes_immediately() {
    let (sup, events) = supervisor(Vec::new(), Duration::from_secs(3));

    assert_eq!(sup.run(&CancellationToken::new()).await, Ok(()));
    assert_eq!(events.kinds(), [EventKind::RunFinished]);
}

#[tokio::test]
async fn events_follow_the_lifecycle() {
    let a = Sentinel::new("a");
    let b = Sentinel::failing("b", TaskError::fail("boom"));
    let (sup, events) = supervisor(vec![a, b], Duration::from_secs(3));

    let _ = sup.run(&CancellationToken::new()).await;

    assert_eq!(
        events.kinds(),
        [
            EventKind::TaskStarting,
            EventKind::TaskStarting,
            EventKind::SupervisorRunning,
            EventKind::ShutdownRequested,
            EventKind::GraceStarted,
            EventKind::TaskStopped,
            EventKind::TaskStopped,
            EventKind::RunFinished,
        ]
    );
    assert_eq!(events.tasks_with(EventKind::TaskStarting), ["a", "b"]);

    let recorded = events.0.lock().unwrap();
    let finished = recorded.last().unwrap();
    assert_eq!(finished.reason.as_deref(), Some("boom"));
    assert_eq!(finished.level(), Level::Warn);
}

#[tokio::test]
async fn panicking_subscriber_does_not_disturb_the_run() {
    struct Broken;

    impl Subscribe for Broken {
        fn on_event(&self, _event: &Event) {
            panic!("sink is broken");
        }
    }

    let a = Sentinel::new("a");
    let b = Sentinel::failing("b", TaskError::fail("boom"));
    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_tasks([a.clone() as TaskRef, b])
        .with_subscribers(vec![Arc::new(Broken)])
        .build();

    assert_eq!(
        sup.run(&CancellationToken::new()).await,
        Err(TaskError::fail("boom"))
    );
    assert!(a.cancelled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_tasks_on_a_parallel_runtime() {
    let sentinels: Vec<_> = (0..32).map(|_| Sentinel::new("worker")).collect();
    let mut tasks: Vec<TaskRef> = sentinels.iter().map(|p| p.clone() as TaskRef).collect();
    tasks.push(Sentinel::failing("canary", TaskError::fail("canary died")));
    let (sup, events) = supervisor(tasks, Duration::from_secs(5));

    let res = sup.run(&CancellationToken::new()).await;

    assert_eq!(res, Err(TaskError::fail("canary died")));
    assert!(sentinels.iter().all(|p| p.cancelled()));
    assert!(events.tasks_with(EventKind::GraceExceeded).is_empty());
}

#[tokio::test]
async fn unbounded_grace_does_not_overflow_the_deadline() {
    let cooperative = Sentinel::new("cooperative");
    let trigger = Sentinel::failing("trigger", TaskError::fail("boom"));
    let (sup, events) = supervisor(vec![cooperative.clone(), trigger], Duration::MAX);

    let res = sup.run(&CancellationToken::new()).await;

    assert_eq!(res, Err(TaskError::fail("boom")));
    assert!(cooperative.cancelled());
    assert_eq!(events.tasks_with(EventKind::TaskStopped), ["cooperative", "trigger"]);
}

#[tokio::test]
async fn run_until_signal_maps_failure_to_exit_failure() {
    let server = Sentinel::new("server");
    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_tasks([
            server.clone() as TaskRef,
            Sentinel::failing("worker", TaskError::fail("boom")),
        ])
        .with_subscribers(Vec::new())
        .build();

    assert_eq!(sup.run_until_signal().await, ExitCode::FAILURE);
    assert!(server.cancelled());
}

#[tokio::test]
async fn run_until_signal_maps_clean_exit_to_success() {
    let server = Sentinel::new("server");
    let oneshot = TaskFn::arc("oneshot", |_ctx: CancellationToken| async {
        Ok::<(), TaskError>(())
    });
    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_tasks([server.clone() as TaskRef, oneshot])
        .with_subscribers(Vec::new())
        .build();

    assert_eq!(sup.run_until_signal().await, ExitCode::SUCCESS);
    assert!(server.cancelled());
}
