/// Execution wrappers that carry the submitting thread's ambient state to the
/// worker that eventually runs the work
///
/// Layering follows the builder calls: every `with_*` wraps everything built
/// so far, so the most recent call becomes the outermost layer. Each layer
/// saves the worker's state of its kind, installs its captured snapshot, runs
/// the inner layers, and restores the saved state on every exit path.
use crate::snapshot::{AmbientStateSnapshot, StateKind};
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Builder for wrapping work with the calling thread's ambient state
pub struct TaskBuilder<W> {
    work: W,
    /// Outermost layer first
    layers: Vec<AmbientStateSnapshot>,
}

impl<W> TaskBuilder<W> {
    /// Start from unmodified work (a closure or a future)
    pub fn wrap(work: W) -> Self {
        Self {
            work,
            layers: Vec::new(),
        }
    }

    /// Diagnostic tags then request scope, tags outermost.
    ///
    /// The request scope must already be active when the diagnostic layer runs
    /// in downstream integrations, so this order is fixed.
    pub fn with_all_request_state(self) -> Self {
        self.with_request_scope().with_diagnostic_tags()
    }

    /// Wrap with the calling thread's request scope, captured now
    pub fn with_request_scope(self) -> Self {
        self.with_state(StateKind::RequestScope)
    }

    /// Wrap with the calling thread's diagnostic tags, captured now
    pub fn with_diagnostic_tags(self) -> Self {
        self.with_state(StateKind::DiagnosticTags)
    }

    /// Wrap with the calling thread's state of `kind`, captured now
    pub fn with_state(self, kind: StateKind) -> Self {
        self.with_snapshot(AmbientStateSnapshot::capture(kind))
    }

    /// Wrap with an explicitly provided snapshot
    pub fn with_snapshot(mut self, snapshot: AmbientStateSnapshot) -> Self {
        self.layers.insert(0, snapshot);
        self
    }

    /// Layer kinds, outermost first
    pub fn layer_kinds(&self) -> Vec<StateKind> {
        self.layers.iter().map(AmbientStateSnapshot::kind).collect()
    }

    /// Finish a closure-based task
    pub fn build<T>(self) -> ContextPropagatingTask<W>
    where
        W: FnOnce() -> T,
    {
        ContextPropagatingTask {
            work: self.work,
            layers: self.layers,
        }
    }

    /// Finish a future-based task
    pub fn build_future(self) -> ContextPropagatingFuture<W>
    where
        W: Future,
    {
        ContextPropagatingFuture {
            inner: self.work,
            layers: self.layers,
        }
    }
}

/// A deferred unit of work together with the ambient state captured when it
/// was wrapped
pub struct ContextPropagatingTask<W> {
    work: W,
    layers: Vec<AmbientStateSnapshot>,
}

impl<W> ContextPropagatingTask<W> {
    /// Layer kinds, outermost first
    pub fn layer_kinds(&self) -> Vec<StateKind> {
        self.layers.iter().map(AmbientStateSnapshot::kind).collect()
    }

    /// Run the work on the current thread under the captured state.
    ///
    /// The result (or panic) of the work is propagated unchanged; the
    /// thread's own state is back in place afterwards either way.
    pub fn call<T>(self) -> T
    where
        W: FnOnce() -> T,
    {
        run_layered(&self.layers, self.work)
    }

    /// Erase the task into a boxed closure for executors that take `FnOnce`
    pub fn into_callable<T>(self) -> Box<dyn FnOnce() -> T + Send>
    where
        W: FnOnce() -> T + Send + 'static,
        T: 'static,
    {
        Box::new(move || self.call())
    }
}

/// A future that runs every poll under the ambient state captured when it was
/// wrapped. Polling may move between worker threads, so state is swapped in
/// and out around each poll rather than once.
#[pin_project]
pub struct ContextPropagatingFuture<F> {
    #[pin]
    inner: F,
    layers: Vec<AmbientStateSnapshot>,
}

impl<F: Future> Future for ContextPropagatingFuture<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let inner = this.inner;
        run_layered(this.layers, move || inner.poll(cx))
    }
}

fn run_layered<T, F>(layers: &[AmbientStateSnapshot], work: F) -> T
where
    F: FnOnce() -> T,
{
    match layers.split_first() {
        Some((outer, rest)) => {
            let _restore = outer.enter();
            run_layered(rest, work)
        }
        None => work(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdc;
    use crate::request_context::RequestContext;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::Arc;

    #[test]
    fn test_wrap_without_layers_runs_work() {
        let task = TaskBuilder::wrap(|| 7).build();
        assert!(task.layer_kinds().is_empty());
        assert_eq!(task.call(), 7);
    }

    #[test]
    fn test_all_request_state_order() {
        let builder = TaskBuilder::wrap(|| ()).with_all_request_state();
        assert_eq!(
            builder.layer_kinds(),
            vec![StateKind::DiagnosticTags, StateKind::RequestScope]
        );
    }

    #[test]
    fn test_snapshot_taken_at_with_call() {
        mdc::clear();
        mdc::put("tag", "at-wrap");
        let task = TaskBuilder::wrap(|| mdc::get("tag"))
            .with_diagnostic_tags()
            .build();
        mdc::put("tag", "at-call");

        assert_eq!(task.call(), Some("at-wrap".to_string()));
        assert_eq!(mdc::get("tag"), Some("at-call".to_string()));
        mdc::clear();
    }

    #[test]
    fn test_absent_state_suppresses_worker_state() {
        mdc::clear();
        let task = TaskBuilder::wrap(mdc::copy_of_context_map)
            .with_diagnostic_tags()
            .build();

        mdc::put("worker", "own");
        assert!(task.call().is_none());
        assert_eq!(mdc::get("worker"), Some("own".to_string()));
        mdc::clear();
    }

    #[test]
    fn test_restores_after_error_result() {
        mdc::clear();
        mdc::put("tag", "caller");
        let task = TaskBuilder::wrap(|| -> Result<(), String> { Err("boom".to_string()) })
            .with_diagnostic_tags()
            .build();
        mdc::put("tag", "worker");

        assert_eq!(task.call(), Err("boom".to_string()));
        assert_eq!(mdc::get("tag"), Some("worker".to_string()));
        mdc::clear();
    }

    #[test]
    fn test_restores_after_panic() {
        mdc::clear();
        RequestContext::set_context_on_current_thread(None);
        mdc::put("tag", "caller");
        let caller_scope = RequestContext::initialize_context();
        let task = TaskBuilder::wrap(|| -> u8 { panic!("work failed") })
            .with_all_request_state()
            .build();

        mdc::put("tag", "worker");
        let worker_scope = RequestContext::initialize_context();

        let outcome = catch_unwind(AssertUnwindSafe(|| task.call()));
        assert!(outcome.is_err());
        assert_eq!(mdc::get("tag"), Some("worker".to_string()));
        let current = RequestContext::context_for_current_thread().unwrap();
        assert!(Arc::ptr_eq(&current, &worker_scope));
        assert!(!Arc::ptr_eq(&current, &caller_scope));

        mdc::clear();
        RequestContext::set_context_on_current_thread(None);
    }

    #[test]
    fn test_same_kind_layers_nest() {
        mdc::clear();
        mdc::put("tag", "first");
        let builder = TaskBuilder::wrap(|| mdc::get("tag")).with_diagnostic_tags();
        mdc::put("tag", "second");
        let task = builder.with_diagnostic_tags().build();

        mdc::put("tag", "worker");
        // The innermost layer wins while the work runs
        assert_eq!(task.call(), Some("first".to_string()));
        assert_eq!(mdc::get("tag"), Some("worker".to_string()));
        mdc::clear();
    }

    #[test]
    fn test_into_callable_keeps_state() {
        mdc::clear();
        mdc::put("tag", "boxed");
        let callable = TaskBuilder::wrap(|| mdc::get("tag"))
            .with_diagnostic_tags()
            .build()
            .into_callable();
        mdc::clear();

        let seen = std::thread::spawn(callable).join().unwrap();
        assert_eq!(seen, Some("boxed".to_string()));
    }

    #[tokio::test]
    async fn test_future_observes_captured_state() {
        mdc::clear();
        mdc::put("tag", "async");
        let fut = TaskBuilder::wrap(async {
            tokio::task::yield_now().await;
            mdc::get("tag")
        })
        .with_diagnostic_tags()
        .build_future();
        mdc::clear();

        assert_eq!(fut.await, Some("async".to_string()));
        assert!(mdc::copy_of_context_map().is_none());
    }
}
