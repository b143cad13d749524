/// Lazily produced results that many consumers can await
///
/// The underlying computation runs at most once, when the first consumer
/// polls it; every clone sees the same cached value.
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pub struct Deferred<T: Clone> {
    inner: Shared<BoxFuture<'static, T>>,
}

impl<T> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    pub fn ready(value: T) -> Self {
        Self::new(futures::future::ready(value))
    }

    /// Attach a side effect that runs exactly once, on whichever thread first
    /// drives the value to completion, before any consumer receives it.
    ///
    /// Nothing is evaluated eagerly: the callback fires only once someone
    /// awaits the returned handle.
    pub fn observe<C>(self, callback: C) -> Self
    where
        C: FnOnce(&T) + Send + 'static,
    {
        let inner = self.inner;
        Self::new(async move {
            let value = inner.await;
            callback(&value);
            value
        })
    }

    /// The value, if it has already been produced
    pub fn peek(&self) -> Option<&T> {
        self.inner.peek()
    }
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> Future for Deferred<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl<T: Clone> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_computation_runs_once_for_all_clones() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();
        let deferred = Deferred::new(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            "value".to_string()
        });

        let other = deferred.clone();
        assert_eq!(deferred.await, "value");
        assert_eq!(other.await, "value");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_observe_is_lazy_and_fires_once() {
        let observed = Arc::new(AtomicU32::new(0));
        let counter = observed.clone();
        let deferred = Deferred::ready(5u32).observe(move |v| {
            counter.fetch_add(*v, Ordering::SeqCst);
        });

        assert_eq!(observed.load(Ordering::SeqCst), 0);
        assert!(deferred.peek().is_none());

        let first = deferred.clone();
        assert_eq!(first.await, 5);
        assert_eq!(deferred.clone().await, 5);
        assert_eq!(observed.load(Ordering::SeqCst), 5);
        assert_eq!(deferred.peek(), Some(&5));
    }
}
