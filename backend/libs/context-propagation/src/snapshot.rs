/// Point-in-time copies of one kind of ambient thread state
use crate::mdc::{self, TagMap};
use crate::request_context::RequestContext;
use std::fmt;
use std::sync::Arc;

/// Kinds of ambient state carried across worker-pool boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Diagnostic tags (MDC)
    DiagnosticTags,
    /// Circuit-breaker request scope
    RequestScope,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKind::DiagnosticTags => f.write_str("diagnostic-tags"),
            StateKind::RequestScope => f.write_str("request-scope"),
        }
    }
}

/// Immutable snapshot of one ambient state kind.
///
/// `None` payloads mean the state was absent on the capturing thread.
/// Installing an absent snapshot removes whatever the executing thread held.
#[derive(Debug, Clone)]
pub enum AmbientStateSnapshot {
    DiagnosticTags(Option<TagMap>),
    RequestScope(Option<Arc<RequestContext>>),
}

impl AmbientStateSnapshot {
    /// Capture the current thread's state of the given kind
    pub fn capture(kind: StateKind) -> Self {
        match kind {
            StateKind::DiagnosticTags => Self::DiagnosticTags(mdc::copy_of_context_map()),
            StateKind::RequestScope => {
                Self::RequestScope(RequestContext::context_for_current_thread())
            }
        }
    }

    pub fn kind(&self) -> StateKind {
        match self {
            Self::DiagnosticTags(_) => StateKind::DiagnosticTags,
            Self::RequestScope(_) => StateKind::RequestScope,
        }
    }

    pub fn is_absent(&self) -> bool {
        match self {
            Self::DiagnosticTags(tags) => tags.is_none(),
            Self::RequestScope(context) => context.is_none(),
        }
    }

    /// Make this snapshot the current state of its kind on this thread
    pub fn install(&self) {
        match self {
            Self::DiagnosticTags(tags) => mdc::set_context_map(tags.clone()),
            Self::RequestScope(context) => {
                RequestContext::set_context_on_current_thread(context.clone())
            }
        }
    }

    /// Save the executing thread's state of this kind, install the snapshot,
    /// and hand back a guard that reinstalls the saved state when dropped
    pub(crate) fn enter(&self) -> RestoreGuard {
        let saved = Self::capture(self.kind());
        self.install();
        RestoreGuard { saved: Some(saved) }
    }
}

/// Restores the state a layer displaced. Runs on return, error and unwind alike.
pub(crate) struct RestoreGuard {
    saved: Option<AmbientStateSnapshot>,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            saved.install();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_absent_tags() {
        mdc::clear();
        let snapshot = AmbientStateSnapshot::capture(StateKind::DiagnosticTags);
        assert_eq!(snapshot.kind(), StateKind::DiagnosticTags);
        assert!(snapshot.is_absent());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        mdc::clear();
        mdc::put("tag", "before");
        let snapshot = AmbientStateSnapshot::capture(StateKind::DiagnosticTags);
        mdc::put("tag", "after");

        snapshot.install();
        assert_eq!(mdc::get("tag"), Some("before".to_string()));
        mdc::clear();
    }

    #[test]
    fn test_enter_restores_on_drop() {
        mdc::clear();
        mdc::put("tag", "worker");

        let absent = AmbientStateSnapshot::DiagnosticTags(None);
        {
            let _guard = absent.enter();
            assert!(mdc::copy_of_context_map().is_none());
        }
        assert_eq!(mdc::get("tag"), Some("worker".to_string()));
        mdc::clear();
    }

    #[test]
    fn test_request_scope_round_trip() {
        RequestContext::set_context_on_current_thread(None);
        let context = RequestContext::initialize_context();
        let snapshot = AmbientStateSnapshot::capture(StateKind::RequestScope);
        assert!(!snapshot.is_absent());

        RequestContext::set_context_on_current_thread(None);
        {
            let _guard = snapshot.enter();
            let current = RequestContext::context_for_current_thread().unwrap();
            assert!(Arc::ptr_eq(&current, &context));
        }
        assert!(!RequestContext::is_current_thread_initialized());
    }
}
