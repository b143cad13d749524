/// Tower Layer integration for call logging
use crate::advice::CoreLoggerAdvice;
use crate::join_point::JoinPoint;
use crate::signature::MethodSignature;
use crate::value::{short_type_name, LogValue, Loggable};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Member name under which service requests are logged
pub const SERVICE_MEMBER: &str = "call";

/// Applies a [`CoreLoggerAdvice`] to every request of the wrapped service.
///
/// Whether a service is wrapped is decided once, in [`Layer::layer`], from the
/// advice's policy and the service's type path.
#[derive(Clone)]
pub struct CallLoggingLayer {
    advice: Arc<CoreLoggerAdvice>,
}

impl CallLoggingLayer {
    pub fn new(advice: Arc<CoreLoggerAdvice>) -> Self {
        Self { advice }
    }
}

impl<S> Layer<S> for CallLoggingLayer {
    type Service = CallLoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        let target_type = std::any::type_name::<S>();
        let advice = self
            .advice
            .intercepts(target_type)
            .then(|| self.advice.clone());

        CallLoggingService {
            inner: service,
            advice,
            signature: Arc::new(
                MethodSignature::new(short_type_name(target_type), SERVICE_MEMBER, ["Request"])
                    .with_parameter_names(["request"]),
            ),
        }
    }
}

#[derive(Clone)]
pub struct CallLoggingService<S> {
    inner: S,
    advice: Option<Arc<CoreLoggerAdvice>>,
    signature: Arc<MethodSignature>,
}

impl<S> CallLoggingService<S> {
    /// Whether requests to this service are logged
    pub fn is_intercepted(&self) -> bool {
        self.advice.is_some()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, Request> Service<Request> for CallLoggingService<S>
where
    S: Service<Request> + 'static,
    S::Future: Send,
    S::Response: Loggable + Send,
    S::Error: std::fmt::Display + Send,
    Request: Loggable + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let target_type = std::any::type_name::<S>();
        let Some(advice) = self.advice.clone() else {
            return Box::pin(self.inner.call(req));
        };
        let Some(logger) = advice.active_logger(target_type) else {
            return Box::pin(self.inner.call(req));
        };

        let signature = self.signature.clone();
        let request = LogValue::describe(&req);
        let response = self.inner.call(req);

        Box::pin(async move {
            let args: [&dyn Loggable; 1] = [&request];
            let join_point = JoinPoint::new(&signature, target_type, &args);
            advice.logged_async(logger, join_point, response).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{CallLogger, LoggerFactory};
    use crate::join_point_logger::StandardJoinPointLogger;
    use crate::params::CoreParameterNameResolver;
    use crate::policy::InterceptionPolicy;
    use crate::redaction::RedactionPolicy;
    use crate::signature::MethodTable;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tower::ServiceExt;

    #[derive(Clone)]
    struct MockService {
        counter: Arc<AtomicU32>,
        fail: bool,
    }

    impl Service<String> for MockService {
        type Response = String;
        type Error = String;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: String) -> Self::Future {
            self.counter.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;

            Box::pin(async move {
                if fail {
                    Err("Service error".to_string())
                } else {
                    Ok(format!("echo {req}"))
                }
            })
        }
    }

    #[derive(Default)]
    struct Lines(Mutex<Vec<String>>);

    impl CallLogger for Lines {
        fn is_debug_enabled(&self) -> bool {
            false
        }

        fn debug(&self, message: &str) {
            self.0.lock().push(message.to_string());
        }
    }

    struct Shared(Arc<Lines>);

    impl LoggerFactory for Shared {
        fn logger(&self, _type_name: &str) -> Arc<dyn CallLogger> {
            self.0.clone()
        }
    }

    /// A request that counts how often it is described
    struct Touchy {
        describes: Arc<AtomicU32>,
        panics: bool,
    }

    impl Loggable for Touchy {
        fn to_log_value(&self) -> LogValue {
            self.describes.fetch_add(1, Ordering::SeqCst);
            if self.panics {
                panic!("cannot describe request");
            }
            LogValue::text("touchy")
        }
    }

    /// A service that is not `Clone`
    struct Accept;

    impl Service<Touchy> for Accept {
        type Response = String;
        type Error = String;
        type Future = std::future::Ready<Result<String, String>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Touchy) -> Self::Future {
            std::future::ready(Ok("accepted".to_string()))
        }
    }

    fn advice(lines: Arc<Lines>, policy: InterceptionPolicy) -> CoreLoggerAdvice {
        let join_point_logger = StandardJoinPointLogger::new(
            Arc::new(CoreParameterNameResolver::new(Arc::new(MethodTable::new()))),
            Arc::new(RedactionPolicy::default()),
        );
        CoreLoggerAdvice::new(Arc::new(join_point_logger), Arc::new(Shared(lines)))
            .with_policy(policy)
    }

    fn layer(lines: Arc<Lines>, policy: InterceptionPolicy) -> CallLoggingLayer {
        CallLoggingLayer::new(Arc::new(advice(lines, policy)))
    }

    #[tokio::test]
    async fn test_layer_logs_request_and_response() {
        let lines = Arc::new(Lines::default());
        let counter = Arc::new(AtomicU32::new(0));
        let service = layer(lines.clone(), InterceptionPolicy::unrestricted()).layer(MockService {
            counter: counter.clone(),
            fail: false,
        });
        assert!(service.is_intercepted());

        let response = service.oneshot("ping&password=x".to_string()).await.unwrap();
        assert_eq!(response, "echo ping&password=x");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(
            *lines.0.lock(),
            vec![
                "\n >>> MockService.call(\n    request=[ping&password=<*protected*>]\n)\n"
                    .to_string(),
                "\n <<< MockService.call\n    result=<echo ping&password=<*protected*>>\n"
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_layer_passes_errors_through() {
        let lines = Arc::new(Lines::default());
        let service = layer(lines.clone(), InterceptionPolicy::unrestricted()).layer(MockService {
            counter: Arc::new(AtomicU32::new(0)),
            fail: true,
        });

        let error = service.oneshot("ping".to_string()).await.unwrap_err();
        assert_eq!(error, "Service error");
        assert_eq!(
            lines.0.lock().last().unwrap(),
            "\n <<< Exception in method: MockService.call Error Message: Service error\n"
        );
    }

    #[tokio::test]
    async fn test_excluded_service_is_not_wrapped() {
        let lines = Arc::new(Lines::default());
        let counter = Arc::new(AtomicU32::new(0));
        let mut service = layer(lines.clone(), InterceptionPolicy::default()).layer(MockService {
            counter: counter.clone(),
            fail: false,
        });
        assert!(!service.is_intercepted());

        let response = service.ready().await.unwrap().call("ping".to_string()).await;
        assert_eq!(response.unwrap(), "echo ping");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(lines.0.lock().is_empty());
    }

    #[tokio::test]
    async fn test_undescribable_request_does_not_fail_call() {
        let lines = Arc::new(Lines::default());
        let describes = Arc::new(AtomicU32::new(0));
        let service = layer(lines.clone(), InterceptionPolicy::unrestricted()).layer(Accept);

        let response = service
            .oneshot(Touchy {
                describes: describes.clone(),
                panics: true,
            })
            .await;

        assert_eq!(response.unwrap(), "accepted");
        assert_eq!(describes.load(Ordering::SeqCst), 1);
        assert_eq!(
            lines.0.lock()[0],
            "\n >>> Accept.call(\n    request=[<*unrenderable*>]\n)\n"
        );
    }

    #[tokio::test]
    async fn test_inactive_logger_skips_describing_request() {
        let lines = Arc::new(Lines::default());
        let describes = Arc::new(AtomicU32::new(0));
        let advice = advice(lines.clone(), InterceptionPolicy::unrestricted());
        advice.set_override_log_config(false);
        let service = CallLoggingLayer::new(Arc::new(advice)).layer(Accept);
        assert!(service.is_intercepted());

        let response = service
            .oneshot(Touchy {
                describes: describes.clone(),
                panics: true,
            })
            .await;

        assert_eq!(response.unwrap(), "accepted");
        assert_eq!(describes.load(Ordering::SeqCst), 0);
        assert!(lines.0.lock().is_empty());
    }
}
