use crate::{ComposedErrorResponse, Failure, FailureType, HandlerRegistryBuilder, HierarchyError};

/// Turns failures of one declared type (and its subtypes) into a response.
pub trait ErrorHandler: Send + Sync {
    /// The most specific failure type this handler claims.
    fn handles(&self) -> &FailureType;

    fn compose(&self, failure: &dyn Failure) -> ComposedErrorResponse;
}

/// Closure-backed [`ErrorHandler`].
pub struct FnHandler<F> {
    handles: FailureType,
    compose: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&dyn Failure) -> ComposedErrorResponse + Send + Sync,
{
    pub fn new(handles: FailureType, compose: F) -> Self {
        Self { handles, compose }
    }
}

impl<F> ErrorHandler for FnHandler<F>
where
    F: Fn(&dyn Failure) -> ComposedErrorResponse + Send + Sync,
{
    fn handles(&self) -> &FailureType {
        &self.handles
    }

    fn compose(&self, failure: &dyn Failure) -> ComposedErrorResponse {
        (self.compose)(failure)
    }
}

/// A pluggable bundle of type declarations and handlers, installed at startup.
pub trait HandlerModule {
    fn name(&self) -> &str;

    fn register(&self, registry: &mut HandlerRegistryBuilder) -> Result<(), HierarchyError>;
}
