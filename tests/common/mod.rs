#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use hivekeeper::{
    Action, Bus, Chain, ChainError, ChainExecutor, Config, Event, FactoryFn, FactoryRef,
    Placeholder, Supervisor, Worker, WorkerBase, WorkerDescriptor, WorkerError, WorkerOption,
    WorkerOptions, WorkerRef,
};

pub const CLASS: &str = "scripted";

/// Counts `run` invocations that are currently active and remembers the peak.
#[derive(Default)]
pub struct Gauge {
    active: AtomicU32,
    peak: AtomicU32,
}

impl Gauge {
    fn enter(&self) -> GaugeGuard<'_> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        GaugeGuard(self)
    }

    pub fn active(&self) -> u32 {
        self.active.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> u32 {
        self.peak.load(Ordering::SeqCst)
    }
}

struct GaugeGuard<'a>(&'a Gauge);

impl Drop for GaugeGuard<'_> {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Worker whose behaviour is driven by its options:
/// - `failures`: number of initial attempts that crash
/// - `panic`: crash by panicking instead of returning `Err`
/// - `emit`: event names published at the start of every healthy attempt
/// - `ignore_stop`: never return from `run`
pub struct Scripted {
    base: WorkerBase,
    failures: u32,
    panic: bool,
    emit: Vec<String>,
    ignore_stop: bool,
    runs: Arc<AtomicU32>,
    buses: Arc<Mutex<Vec<Bus>>>,
    gauge: Arc<Gauge>,
}

#[async_trait]
impl Worker for Scripted {
    fn base(&self) -> &WorkerBase {
        &self.base
    }

    async fn run(&self, ctx: CancellationToken, events: Bus) -> Result<(), WorkerError> {
        let _active = self.gauge.enter();
        let n = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        self.buses.lock().unwrap().push(events.clone());
        if n <= self.failures {
            if self.panic {
                panic!("scripted crash #{n}");
            }
            return Err(WorkerError::fail(format!("scripted crash #{n}")));
        }

        for name in &self.emit {
            events
                .publish(
                    Event::new(self.name(), name.as_str())
                        .with_option(Placeholder::new("attempt", "int", n)),
                )
                .await?;
        }

        if self.ignore_stop {
            std::future::pending::<()>().await;
        }
        ctx.cancelled().await;
        Ok(())
    }

    async fn handle_action(&self, action: &Action) -> Result<Vec<Placeholder>, WorkerError> {
        match action.name.as_str() {
            "echo" => Ok(vec![Placeholder::new(
                "echo",
                "string",
                action.option("text").cloned().unwrap_or_default(),
            )]),
            other => Err(WorkerError::fail(format!("unsupported action {other}"))),
        }
    }
}

/// Factory for [`Scripted`] workers; `runs` counts every `run` invocation of this class
/// `buses` collects the bus handle each invocation received and `gauge` tracks
/// how many invocations are active at once.
pub fn scripted_factory(
    runs: Arc<AtomicU32>,
    buses: Arc<Mutex<Vec<Bus>>>,
    gauge: Arc<Gauge>,
) -> FactoryRef {
    Arc::new(
        FactoryFn::new(
            CLASS,
            move |name: &str, desc: &str, opts: WorkerOptions| -> Result<WorkerRef, WorkerError> {
                let failures = opts.bind::<u32>("failures").unwrap_or(0);
                let panic = opts.bind::<bool>("panic").unwrap_or(false);
                let emit = opts.bind::<Vec<String>>("emit").unwrap_or_default();
                let ignore_stop = opts.bind::<bool>("ignore_stop").unwrap_or(false);
                if opts.bind::<bool>("reject").unwrap_or(false) {
                    return Err(WorkerError::InvalidOptions {
                        error: "rejected by test".into(),
                    });
                }
                Ok(Arc::new(Scripted {
                    base: WorkerBase::new(name, CLASS, desc, opts),
                    failures,
                    panic,
                    emit,
                    ignore_stop,
                    runs: Arc::clone(&runs),
                    buses: Arc::clone(&buses),
                    gauge: Arc::clone(&gauge),
                }))
            },
        )
        .with_event("on", "the light was switched on")
        .with_action("echo", "returns its text option"),
    )
}

/// Executor that records every event it receives together with the chain count.
#[derive(Default)]
pub struct Recorder {
    seen: Mutex<Vec<(Event, usize)>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(e, _)| e.clone())
            .collect()
    }

    pub fn chain_counts(&self) -> Vec<usize> {
        self.seen.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ChainExecutor for Recorder {
    async fn execute(&self, chains: &[Chain], event: &Event) -> Result<(), ChainError> {
        self.seen.lock().unwrap().push((event.clone(), chains.len()));
        Ok(())
    }
}

pub struct Hive {
    pub sup: Arc<Supervisor>,
    pub recorder: Arc<Recorder>,
    pub runs: Arc<AtomicU32>,
    pub buses: Arc<Mutex<Vec<Bus>>>,
    pub gauge: Arc<Gauge>,
}

pub fn hive() -> Hive {
    hive_with(Config {
        grace: Duration::from_secs(2),
        ..Config::default()
    })
}

pub fn hive_with(cfg: Config) -> Hive {
    let recorder = Arc::new(Recorder::default());
    let runs = Arc::new(AtomicU32::new(0));
    let buses = Arc::new(Mutex::new(Vec::new()));
    let gauge = Arc::new(Gauge::default());
    let sup = Supervisor::builder(cfg)
        .with_factory(scripted_factory(
            Arc::clone(&runs),
            Arc::clone(&buses),
            Arc::clone(&gauge),
        ))
        .with_executor(recorder.clone())
        .build();
    Hive {
        sup,
        recorder,
        runs,
        buses,
        gauge,
    }
}

pub fn descriptor(name: &str) -> WorkerDescriptor {
    WorkerDescriptor::new(name, CLASS).with_description(format!("{name} under test"))
}

pub fn opt(name: &str, value: impl Into<serde_json::Value>) -> WorkerOption {
    WorkerOption::new(name, value)
}

/// Polls `cond` every 5ms until it holds; panics after 2s.
pub async fn eventually<F, Fut>(what: &str, mut cond: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let res = tokio::time::timeout(Duration::from_secs(2), async {
        while !cond().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(res.is_ok(), "timed out waiting for: {what}");
}

/// Gives spawned tasks time to misbehave.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
