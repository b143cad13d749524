/// Registry of breaker-runtime plugins
///
/// Holds the single concurrency-strategy slot the runtime consults before
/// submitting work to a pool, plus the reset hooks through which the runtime
/// clears its own global state. One process-wide instance is available via
/// [`PluginRegistry::global`], but every operation works on an explicit
/// instance so tests can build fresh registries.
use crate::error::PluginError;
use crate::strategy::{ConcurrencyStrategy, Job};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

type ResetHook = Arc<dyn Fn() + Send + Sync>;

static GLOBAL: Lazy<Arc<PluginRegistry>> = Lazy::new(|| Arc::new(PluginRegistry::new()));

pub struct PluginRegistry {
    strategy: RwLock<Option<Arc<dyn ConcurrencyStrategy>>>,
    reset_hooks: RwLock<Vec<ResetHook>>,
    generation: AtomicU64,
    /// Serializes init/destroy cycles against this registry
    lifecycle: Mutex<()>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            strategy: RwLock::new(None),
            reset_hooks: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
            lifecycle: Mutex::new(()),
        }
    }

    /// Process-wide registry used by the breaker runtime
    pub fn global() -> Arc<PluginRegistry> {
        GLOBAL.clone()
    }

    /// Fill the strategy slot.
    ///
    /// Registering the implementation already in the slot is a no-op. A
    /// different implementation in the slot is an error.
    pub fn register_concurrency_strategy(
        &self,
        strategy: Arc<dyn ConcurrencyStrategy>,
    ) -> Result<(), PluginError> {
        let mut slot = self.strategy.write();

        if let Some(existing) = slot.as_ref() {
            if existing.name() == strategy.name() {
                debug!(strategy = strategy.name(), "Concurrency strategy already registered");
                return Ok(());
            }
            warn!(
                existing = existing.name(),
                attempted = strategy.name(),
                "Rejecting second concurrency strategy"
            );
            return Err(PluginError::AlreadyRegistered {
                existing: existing.name(),
                attempted: strategy.name(),
            });
        }

        info!(strategy = strategy.name(), "Concurrency strategy registered");
        *slot = Some(strategy);
        Ok(())
    }

    pub fn concurrency_strategy(&self) -> Option<Arc<dyn ConcurrencyStrategy>> {
        self.strategy.read().clone()
    }

    /// Wrap a job with the registered strategy; jobs pass through unchanged
    /// while the slot is empty
    pub fn wrap_job(&self, job: Job) -> Job {
        match self.concurrency_strategy() {
            Some(strategy) => strategy.wrap_job(job),
            None => job,
        }
    }

    /// Attach runtime state that has to be cleared on every reset
    pub fn add_reset_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.reset_hooks.write().push(Arc::new(hook));
    }

    /// Clear the strategy slot and run every reset hook.
    ///
    /// Waits at most `timeout` for in-progress registrations to finish. Hooks
    /// run without any registry lock held, so a hook may register strategies
    /// or further hooks; hooks added during a reset first run on the next one.
    pub fn reset(&self, timeout: Duration) -> Result<(), PluginError> {
        let mut slot = self
            .strategy
            .try_write_for(timeout)
            .ok_or(PluginError::ResetTimedOut(timeout))?;
        slot.take();
        drop(slot);

        let hooks: Vec<ResetHook> = self.reset_hooks.read().clone();
        for hook in hooks {
            hook();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, "Plugins reset");
        Ok(())
    }

    /// Number of completed resets
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub(crate) fn lock_lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock()
    }
}
