//! # Example: Motion-triggered light
//!
//! A `motion` sensor emits an event every few hundred milliseconds (and crashes once on
//! its second attempt to show recovery). A chain routes `porch/motion` to the `light`
//! worker's `on` action through a small executor that resolves `"worker.action"` names.
//!
//! Run with:
//! ```text
//! RUST_LOG=info cargo run --example hive
//! ```
//! Stop with Ctrl+C.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hivekeeper::{
    Action, Bus, Chain, ChainError, ChainExecutor, Config, Event, EventSelector, FactoryFn,
    Placeholder, Supervisor, Worker, WorkerBase, WorkerDescriptor, WorkerError, WorkerOption,
    WorkerOptions, WorkerRef,
};

struct MotionSensor {
    base: WorkerBase,
    interval: Duration,
    attempts: AtomicU32,
}

#[async_trait]
impl Worker for MotionSensor {
    fn base(&self) -> &WorkerBase {
        &self.base
    }

    async fn run(&self, ctx: CancellationToken, events: Bus) -> Result<(), WorkerError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let mut ticks = 0u32;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.interval) => {}
            }
            ticks += 1;
            if attempt == 1 && ticks == 3 {
                return Err(WorkerError::fail("sensor lost its serial port"));
            }
            events
                .publish(
                    Event::new(self.name(), "motion").with_option(Placeholder::new(
                        "tick",
                        "int",
                        ticks,
                    )),
                )
                .await?;
        }
    }

    async fn handle_action(&self, action: &Action) -> Result<Vec<Placeholder>, WorkerError> {
        Err(WorkerError::fail(format!(
            "sensor has no action {}",
            action.name
        )))
    }
}

struct Light {
    base: WorkerBase,
    on: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl Worker for Light {
    fn base(&self) -> &WorkerBase {
        &self.base
    }

    async fn run(&self, ctx: CancellationToken, _events: Bus) -> Result<(), WorkerError> {
        ctx.cancelled().await;
        Ok(())
    }

    async fn handle_action(&self, action: &Action) -> Result<Vec<Placeholder>, WorkerError> {
        let on = match action.name.as_str() {
            "on" => true,
            "off" => false,
            other => return Err(WorkerError::fail(format!("light has no action {other}"))),
        };
        self.on.store(on, Ordering::SeqCst);
        info!(light = %self.name(), on, "light switched");
        Ok(vec![Placeholder::new("on", "bool", on)])
    }
}

/// Resolves chain actions written as `"worker.action"` against the supervisor.
#[derive(Default)]
struct RouteExecutor {
    sup: OnceLock<Weak<Supervisor>>,
}

#[async_trait]
impl ChainExecutor for RouteExecutor {
    async fn execute(&self, chains: &[Chain], event: &Event) -> Result<(), ChainError> {
        let Some(sup) = self.sup.get().and_then(Weak::upgrade) else {
            return Ok(());
        };
        let matching = chains
            .iter()
            .filter(|c| c.event.worker == event.worker && c.event.name == event.name);
        for chain in matching {
            for target in &chain.actions {
                let (worker, name) = target.split_once('.').ok_or_else(|| ChainError::Fail {
                    error: format!("malformed action {target}"),
                })?;
                sup.execute_action(&Action::new(worker, name))
                    .await
                    .map_err(|e| ChainError::Fail {
                        error: e.to_string(),
                    })?;
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = Config {
        grace: Duration::from_secs(5),
        ..Config::default()
    };

    let executor = Arc::new(RouteExecutor::default());
    let sup = Supervisor::builder(cfg)
        .with_factory(Arc::new(
            FactoryFn::new("motion", |name: &str, desc: &str, opts: WorkerOptions| {
                let interval_ms = opts.bind::<u64>("interval_ms").unwrap_or(500);
                Ok(Arc::new(MotionSensor {
                    base: WorkerBase::new(name, "motion", desc, opts),
                    interval: Duration::from_millis(interval_ms),
                    attempts: AtomicU32::new(0),
                }) as WorkerRef)
            })
            .with_description("PIR motion sensor")
            .with_event("motion", "movement was detected"),
        ))
        .with_factory(Arc::new(
            FactoryFn::new("light", |name: &str, desc: &str, opts: WorkerOptions| {
                Ok(Arc::new(Light {
                    base: WorkerBase::new(name, "light", desc, opts),
                    on: Default::default(),
                }) as WorkerRef)
            })
            .with_description("switchable light")
            .with_action("on", "switch the light on")
            .with_action("off", "switch the light off"),
        ))
        .with_executor(executor.clone())
        .build();

    if executor.sup.set(Arc::downgrade(&sup)).is_err() {
        warn!("executor already bound");
    }

    sup.set_chains(vec![Chain {
        name: "porch-light".into(),
        description: "light the porch on movement".into(),
        event: EventSelector {
            worker: "porch".into(),
            name: "motion".into(),
        },
        filters: Vec::new(),
        actions: vec!["hall.on".into()],
    }]);

    sup.serve(vec![
        WorkerDescriptor::new("porch", "motion")
            .with_description("porch motion sensor")
            .with_option(WorkerOption::new("interval_ms", 300)),
        WorkerDescriptor::new("hall", "light").with_description("hall ceiling light"),
    ])
    .await?;

    Ok(())
}
