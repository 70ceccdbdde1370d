use std::sync::Arc;

use super::{config::Config, registry::Registry, supervisor::Supervisor};
use crate::chains::{Chain, ChainExecutor, Chains, NoopExecutor};
use crate::workers::FactoryRef;

/// Builder for constructing a Supervisor.
pub struct SupervisorBuilder {
    cfg: Config,
    factories: Vec<FactoryRef>,
    executor: Option<Arc<dyn ChainExecutor>>,
    chains: Vec<Chain>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            factories: Vec::new(),
            executor: None,
            chains: Vec::new(),
        }
    }

    /// Registers a worker factory.
    pub fn with_factory(mut self, factory: FactoryRef) -> Self {
        self.factories.push(factory);
        self
    }

    /// Registers several worker factories.
    pub fn with_factories(mut self, factories: impl IntoIterator<Item = FactoryRef>) -> Self {
        self.factories.extend(factories);
        self
    }

    /// Sets the rule engine that receives every dispatched event.
    ///
    /// Without one, events are logged and dropped.
    pub fn with_executor(mut self, executor: Arc<dyn ChainExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets the initial chain configuration.
    pub fn with_chains(mut self, chains: Vec<Chain>) -> Self {
        self.chains = chains;
        self
    }

    /// Builds and returns the Supervisor instance.
    ///
    /// No task is spawned yet; the bus and dispatcher start with the first worker.
    pub fn build(self) -> Arc<Supervisor> {
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(NoopExecutor) as Arc<dyn ChainExecutor>);

        Arc::new(Supervisor::new_internal(
            self.cfg,
            Registry::with_factories(self.factories),
            executor,
            Chains::new(self.chains),
        ))
    }
}
