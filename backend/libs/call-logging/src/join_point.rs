/// The matched-call boundary handed to the advice
use crate::signature::MethodSignature;
use crate::value::Loggable;

/// Name of the concrete type of a value, resolved through dynamic dispatch.
///
/// Implemented for every sized type. Traits whose implementations are logged
/// through trait objects declare it as a supertrait:
///
/// ```rust
/// use call_logging::join_point::TargetType;
///
/// trait OrderService: TargetType + Send + Sync {}
///
/// struct OrderServiceImpl;
/// impl OrderService for OrderServiceImpl {}
///
/// let service: Box<dyn OrderService> = Box::new(OrderServiceImpl);
/// let target: &dyn OrderService = &*service;
/// assert!(target.target_type_name().ends_with("OrderServiceImpl"));
/// ```
pub trait TargetType {
    fn target_type_name(&self) -> &'static str;
}

impl<T> TargetType for T {
    fn target_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// One intercepted invocation: what was called, on which concrete type, with
/// which arguments. Borrowed for the duration of the call.
#[derive(Clone, Copy)]
pub struct JoinPoint<'a> {
    signature: &'a MethodSignature,
    target_type: &'a str,
    args: &'a [&'a dyn Loggable],
}

impl<'a> JoinPoint<'a> {
    pub fn new(
        signature: &'a MethodSignature,
        target_type: &'a str,
        args: &'a [&'a dyn Loggable],
    ) -> Self {
        Self {
            signature,
            target_type,
            args,
        }
    }

    /// Join point whose target type is the concrete type behind `target`.
    ///
    /// Through a trait object the name comes from the implementing type, as
    /// long as the trait has [`TargetType`] as a supertrait. Pass the object
    /// itself (`&*boxed`), not the box.
    pub fn for_target<T: TargetType + ?Sized>(
        signature: &'a MethodSignature,
        target: &T,
        args: &'a [&'a dyn Loggable],
    ) -> Self {
        Self::new(signature, target.target_type_name(), args)
    }

    pub fn signature(&self) -> &'a MethodSignature {
        self.signature
    }

    /// Type name of the declaration the call was matched against
    pub fn declaring_type(&self) -> &'a str {
        self.signature.declaring_type()
    }

    pub fn member(&self) -> &'a str {
        self.signature.name()
    }

    /// Concrete type of the call's target; loggers are keyed by it
    pub fn target_type(&self) -> &'a str {
        self.target_type
    }

    pub fn args(&self) -> &'a [&'a dyn Loggable] {
        self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait OrderService: TargetType {
        fn place(&self, quantity: u32) -> u32;
    }

    struct OrderServiceImpl;

    impl OrderService for OrderServiceImpl {
        fn place(&self, quantity: u32) -> u32 {
            quantity
        }
    }

    #[test]
    fn test_for_target_uses_runtime_type() {
        let signature = MethodSignature::new("OrderService", "place", ["u32"]).declared_on_trait();
        let args: [&dyn Loggable; 1] = [&3u32];
        let jp = JoinPoint::for_target(&signature, &OrderServiceImpl, &args);

        assert!(jp.target_type().ends_with("OrderServiceImpl"));
        assert_eq!(jp.declaring_type(), "OrderService");
        assert_eq!(jp.member(), "place");
        assert_eq!(jp.args().len(), 1);
    }

    #[test]
    fn test_for_target_through_trait_object() {
        let signature = MethodSignature::new("OrderService", "place", ["u32"]).declared_on_trait();
        let service: Box<dyn OrderService> = Box::new(OrderServiceImpl);
        let args: [&dyn Loggable; 1] = [&3u32];
        let jp = JoinPoint::for_target(&signature, &*service, &args);

        assert!(jp.target_type().ends_with("OrderServiceImpl"));
        assert!(!jp.target_type().contains("dyn"));
        assert_eq!(service.place(3), 3);
    }
}
