/// Lifecycle of the concurrency strategy registration
use crate::config::PropagationConfig;
use crate::error::PluginError;
use crate::plugins::PluginRegistry;
use crate::strategy::CoreConcurrencyStrategy;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Registers [`CoreConcurrencyStrategy`] with a plugin registry and resets the
/// registry on shutdown.
///
/// `init` and `destroy` may be called any number of times in any order; calls
/// against the same registry are serialized.
pub struct PluginInitializer {
    registry: Arc<PluginRegistry>,
    reset_timeout: Duration,
}

impl PluginInitializer {
    pub fn new(registry: Arc<PluginRegistry>, reset_timeout: Duration) -> Self {
        Self {
            registry,
            reset_timeout,
        }
    }

    /// Initializer for the process-wide registry, or `None` when automatic
    /// registration is disabled
    pub fn from_config(config: &PropagationConfig) -> Option<Self> {
        if !config.auto {
            info!("Automatic concurrency strategy registration disabled");
            return None;
        }
        Some(Self::new(PluginRegistry::global(), config.reset_timeout()))
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Reset the runtime, then register the strategy.
    ///
    /// Resetting first clears a strategy left behind by an earlier cycle. A
    /// different strategy registered concurrently by another component is
    /// returned as an error and must not be ignored.
    pub fn init(&self) -> Result<(), PluginError> {
        let _lifecycle = self.registry.lock_lifecycle();
        info!("Initialising concurrency plugins");

        self.registry.reset(self.reset_timeout)?;
        self.registry
            .register_concurrency_strategy(Arc::new(CoreConcurrencyStrategy::new()))?;

        let strategy = self
            .registry
            .concurrency_strategy()
            .map(|s| s.name())
            .unwrap_or("none");
        info!(strategy, "Concurrency plugins initialised");
        Ok(())
    }

    pub fn destroy(&self) -> Result<(), PluginError> {
        let _lifecycle = self.registry.lock_lifecycle();
        info!("Destroying concurrency plugins");
        self.registry.reset(self.reset_timeout)
    }
}
