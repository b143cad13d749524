/// Execution-context propagation for worker pools
///
/// Work that a circuit-breaker runtime defers to one of its thread pools loses
/// the submitting thread's ambient state: diagnostic tags and the request
/// scope. This library captures that state when the work is wrapped and
/// replays it on whichever worker runs it, restoring the worker's own state
/// afterwards on every exit path.
///
/// - **Ambient stores**: thread-local diagnostic tags ([`mdc`]) and request
///   scope ([`RequestContext`])
/// - **Snapshots**: immutable copies of one kind of ambient state
/// - **TaskBuilder**: layers snapshots around a closure or a future
/// - **CoreConcurrencyStrategy**: the hook the breaker runtime calls before
///   submitting work
/// - **PluginRegistry / PluginInitializer**: registration lifecycle of that hook
///
/// # Example: carrying tags to another thread
///
/// ```rust
/// use context_propagation::{mdc, TaskBuilder};
///
/// mdc::put("correlation_id", "abc-123");
/// let task = TaskBuilder::wrap(|| mdc::get("correlation_id"))
///     .with_all_request_state()
///     .build();
///
/// let seen = std::thread::spawn(move || task.call()).join().unwrap();
/// assert_eq!(seen.as_deref(), Some("abc-123"));
/// ```
///
/// # Example: registering the strategy at startup
///
/// ```rust
/// use context_propagation::{PluginInitializer, PropagationConfig};
///
/// # fn main() -> Result<(), context_propagation::PluginError> {
/// if let Some(initializer) = PluginInitializer::from_config(&PropagationConfig::from_env()) {
///     initializer.init()?;
/// }
/// # Ok(())
/// # }
/// ```

pub mod config;
pub mod error;
pub mod initializer;
pub mod mdc;
pub mod plugins;
pub mod request_context;
pub mod snapshot;
pub mod strategy;
pub mod task;

// Re-export main types for convenience
pub use config::PropagationConfig;
pub use error::PluginError;
pub use initializer::PluginInitializer;
pub use plugins::PluginRegistry;
pub use request_context::{RequestContext, RequestContextGuard};
pub use snapshot::{AmbientStateSnapshot, StateKind};
pub use strategy::{ConcurrencyStrategy, CoreConcurrencyStrategy, Job};
pub use task::{ContextPropagatingFuture, ContextPropagatingTask, TaskBuilder};
