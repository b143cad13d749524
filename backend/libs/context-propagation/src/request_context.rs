//! Thread-local request scope used by circuit-breaker commands
//!
//! A `RequestContext` is created when a request enters the service and holds
//! request-scoped variables (caches, collapsers, correlation data). The breaker
//! runtime reads it from the executing thread, so it has to be carried across
//! worker-pool boundaries together with the work.

use parking_lot::RwLock;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

thread_local! {
    static CURRENT: RefCell<Option<Arc<RequestContext>>> = const { RefCell::new(None) };
}

/// Request-scoped state shared by every thread that works on one request
#[derive(Debug)]
pub struct RequestContext {
    id: Uuid,
    variables: RwLock<HashMap<String, String>>,
}

impl RequestContext {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            variables: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new scope and install it on the current thread
    pub fn initialize_context() -> Arc<RequestContext> {
        let context = Arc::new(Self::new());
        debug!(request_context = %context.id, "Request context initialised");
        Self::set_context_on_current_thread(Some(context.clone()));
        context
    }

    /// Like [`RequestContext::initialize_context`], but the scope is shut down
    /// and removed from the thread when the returned guard drops
    pub fn initialize_context_scoped() -> RequestContextGuard {
        RequestContextGuard {
            context: Self::initialize_context(),
        }
    }

    /// The scope installed on the current thread, if any
    pub fn context_for_current_thread() -> Option<Arc<RequestContext>> {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Install (or with `None`, remove) the scope of the current thread
    pub fn set_context_on_current_thread(context: Option<Arc<RequestContext>>) {
        CURRENT.with(|current| {
            *current.borrow_mut() = context;
        });
    }

    pub fn is_current_thread_initialized() -> bool {
        CURRENT.with(|current| current.borrow().is_some())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn set_variable(&self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.write().insert(name.into(), value.into());
    }

    pub fn variable(&self, name: &str) -> Option<String> {
        self.variables.read().get(name).cloned()
    }

    /// Release every request-scoped variable
    pub fn shutdown(&self) {
        self.variables.write().clear();
        debug!(request_context = %self.id, "Request context shut down");
    }
}

/// Owns a request scope for the lifetime of a block
pub struct RequestContextGuard {
    context: Arc<RequestContext>,
}

impl RequestContextGuard {
    pub fn context(&self) -> &Arc<RequestContext> {
        &self.context
    }
}

impl Drop for RequestContextGuard {
    fn drop(&mut self) {
        self.context.shutdown();
        let installed_here = RequestContext::context_for_current_thread()
            .is_some_and(|current| Arc::ptr_eq(&current, &self.context));
        if installed_here {
            RequestContext::set_context_on_current_thread(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_installs_on_current_thread() {
        RequestContext::set_context_on_current_thread(None);
        assert!(!RequestContext::is_current_thread_initialized());

        let context = RequestContext::initialize_context();
        let current = RequestContext::context_for_current_thread().unwrap();
        assert!(Arc::ptr_eq(&context, &current));

        RequestContext::set_context_on_current_thread(None);
    }

    #[test]
    fn test_variables() {
        let context = RequestContext::new();
        context.set_variable("cache-key", "42");
        assert_eq!(context.variable("cache-key"), Some("42".to_string()));

        context.shutdown();
        assert_eq!(context.variable("cache-key"), None);
    }

    #[test]
    fn test_scoped_guard_removes_context() {
        RequestContext::set_context_on_current_thread(None);
        {
            let guard = RequestContext::initialize_context_scoped();
            guard.context().set_variable("a", "b");
            assert!(RequestContext::is_current_thread_initialized());
        }
        assert!(!RequestContext::is_current_thread_initialized());
    }

    #[test]
    fn test_scoped_guard_leaves_foreign_context_installed() {
        let guard = RequestContext::initialize_context_scoped();
        let other = Arc::new(RequestContext::new());
        RequestContext::set_context_on_current_thread(Some(other.clone()));

        drop(guard);

        let current = RequestContext::context_for_current_thread().unwrap();
        assert!(Arc::ptr_eq(&current, &other));
        RequestContext::set_context_on_current_thread(None);
    }
}
