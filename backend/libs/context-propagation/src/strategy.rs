/// Concurrency strategy hook called by the breaker runtime before work is
/// handed to one of its worker pools
use crate::task::{ContextPropagatingFuture, ContextPropagatingTask, TaskBuilder};
use std::future::Future;

/// Type-erased unit of work submitted to a worker pool
pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait ConcurrencyStrategy: Send + Sync {
    /// Identifies the implementation; two strategies with the same name are
    /// considered the same registration
    fn name(&self) -> &'static str;

    /// Wrap a job before it crosses into a worker thread
    fn wrap_job(&self, job: Job) -> Job;
}

/// Copies the submitting thread's diagnostic tags and request scope into the
/// worker that runs the job. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreConcurrencyStrategy;

impl CoreConcurrencyStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Typed variant of [`ConcurrencyStrategy::wrap_job`]
    pub fn wrap_callable<F, T>(&self, callable: F) -> ContextPropagatingTask<F>
    where
        F: FnOnce() -> T,
    {
        TaskBuilder::wrap(callable).with_all_request_state().build()
    }

    /// Same wrapping for a future that will be polled on a runtime worker
    pub fn wrap_future<F: Future>(&self, future: F) -> ContextPropagatingFuture<F> {
        TaskBuilder::wrap(future)
            .with_all_request_state()
            .build_future()
    }
}

impl ConcurrencyStrategy for CoreConcurrencyStrategy {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn wrap_job(&self, job: Job) -> Job {
        self.wrap_callable(job).into_callable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdc;
    use crate::request_context::RequestContext;
    use std::sync::mpsc;
    use std::sync::Arc;

    #[test]
    fn test_wrap_job_carries_tags_and_scope() {
        mdc::clear();
        mdc::put("request", "r-1");
        let scope = RequestContext::initialize_context();

        let (tx, rx) = mpsc::channel();
        let job = CoreConcurrencyStrategy::new().wrap_job(Box::new(move || {
            let _ = tx.send((
                mdc::get("request"),
                RequestContext::context_for_current_thread().map(|c| c.id()),
            ));
        }));

        std::thread::spawn(job).join().unwrap();
        let (tag, scope_id) = rx.recv().unwrap();
        assert_eq!(tag, Some("r-1".to_string()));
        assert_eq!(scope_id, Some(scope.id()));

        mdc::clear();
        RequestContext::set_context_on_current_thread(None);
    }

    #[test]
    fn test_wrap_callable_returns_value() {
        mdc::clear();
        let strategy = CoreConcurrencyStrategy::new();
        let task = strategy.wrap_callable(|| Arc::new(5));
        assert_eq!(*task.call(), 5);
    }

    #[test]
    fn test_name_is_stable() {
        let a = CoreConcurrencyStrategy::new();
        let b = CoreConcurrencyStrategy;
        assert_eq!(a.name(), b.name());
        assert!(a.name().ends_with("CoreConcurrencyStrategy"));
    }
}
