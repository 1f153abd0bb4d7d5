use tracing::{debug, info, warn};

use crate::{ComposedErrorResponse, Failure, HandlerModule, HandlerRegistry, HierarchyError};

/// Single place that turns a failure into the externally visible error body.
///
/// Stateless after construction; share it behind an `Arc` across workers.
#[derive(Debug)]
pub struct ErrorComposer {
    registry: HandlerRegistry,
}

impl ErrorComposer {
    pub fn new(registry: HandlerRegistry) -> Self {
        info!(
            handlers = registry.len(),
            warnings = registry.warnings().len(),
            "configuring error response composer"
        );
        Self { registry }
    }

    /// Build a composer from a set of modules, installed in the given order.
    pub fn from_modules(modules: &[&dyn HandlerModule]) -> Result<Self, HierarchyError> {
        let mut builder = HandlerRegistry::builder();
        for module in modules {
            builder.install(*module)?;
        }
        Ok(Self::new(builder.build()))
    }

    /// Compose the response for `failure`. Always returns a body.
    pub fn compose(&self, failure: &dyn Failure) -> ComposedErrorResponse {
        let failure_type = failure.failure_type();

        match self.registry.resolve(&failure_type) {
            Some(entry) => {
                debug!(
                    failure_type = %failure_type,
                    handler = %entry.handles(),
                    "composing error response"
                );
                entry.handler().compose(failure)
            }
            None => {
                // The failure's own text stays in the server log only.
                warn!(
                    failure_type = %failure_type,
                    error = %failure,
                    "no error handler matched; responding with internal error"
                );
                ComposedErrorResponse::internal_error()
            }
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailureType, HandlerRegistryBuilder, StatusCategory};

    #[derive(Debug, thiserror::Error)]
    #[error("{kind}: secret detail at 0xdeadbeef")]
    struct TestFailure {
        kind: &'static str,
    }

    impl Failure for TestFailure {
        fn failure_type(&self) -> FailureType {
            FailureType::from_static(self.kind)
        }
    }

    struct ValidationModule;

    impl HandlerModule for ValidationModule {
        fn name(&self) -> &str {
            "validation"
        }

        fn register(&self, registry: &mut HandlerRegistryBuilder) -> Result<(), HierarchyError> {
            registry
                .declare(
                    FailureType::from_static("validation"),
                    FailureType::from_static("failure"),
                )?
                .declare(
                    FailureType::from_static("duplicate_email"),
                    FailureType::from_static("validation"),
                )?;
            registry.register_fn(FailureType::from_static("validation"), |_: &dyn Failure| {
                ComposedErrorResponse::new(StatusCategory::UnprocessableEntity, "validation_error", "invalid input")
            });
            registry.register_fn(FailureType::from_static("duplicate_email"), |_: &dyn Failure| {
                ComposedErrorResponse::new(StatusCategory::UnprocessableEntity, "email_unavailable", "email unavailable")
            });
            Ok(())
        }
    }

    fn composer() -> ErrorComposer {
        ErrorComposer::from_modules(&[&ValidationModule]).unwrap()
    }

    #[test]
    fn picks_exact_handler_over_ancestor() {
        let body = composer().compose(&TestFailure { kind: "duplicate_email" });
        assert_eq!(body.error, "email_unavailable");
    }

    #[test]
    fn falls_back_to_ancestor_handler() {
        let body = composer().compose(&TestFailure { kind: "validation" });
        assert_eq!(body.error, "validation_error");
    }

    #[test]
    fn unmatched_failure_gets_generic_internal_error() {
        let body = composer().compose(&TestFailure { kind: "database_exploded" });
        assert_eq!(body, ComposedErrorResponse::internal_error());
        assert_eq!(body.status, StatusCategory::Internal);
        assert!(!body.message.contains("0xdeadbeef"));
        assert!(body.details.is_none());
    }

    #[test]
    fn empty_composer_still_answers() {
        let composer = ErrorComposer::new(HandlerRegistry::builder().build());
        assert!(composer.registry().is_empty());
        let body = composer.compose(&TestFailure { kind: "validation" });
        assert_eq!(body.error, "internal_error");
    }
}
