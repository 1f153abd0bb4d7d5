//! Error handlers for account failures.
//!
//! Token and email failures always produce the same fixed body, whatever the
//! underlying cause, so responses cannot be used to probe for accounts.

use warden_core::failure_types::{
    ACCOUNT, DUPLICATE_EMAIL, FAILURE, FORBIDDEN, INVALID_OR_EXPIRED_TOKEN, NOT_FOUND, VALIDATION,
};
use warden_errors::{
    ComposedErrorResponse, Failure, HandlerModule, HandlerRegistryBuilder, HierarchyError,
    StatusCategory,
};

/// Declares `failure > account > {...}` and registers a handler per leaf.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccountHandlerModule;

impl HandlerModule for AccountHandlerModule {
    fn name(&self) -> &str {
        "account"
    }

    fn register(&self, registry: &mut HandlerRegistryBuilder) -> Result<(), HierarchyError> {
        registry
            .declare(ACCOUNT, FAILURE)?
            .declare(VALIDATION, ACCOUNT)?
            .declare(DUPLICATE_EMAIL, VALIDATION)?
            .declare(INVALID_OR_EXPIRED_TOKEN, ACCOUNT)?
            .declare(FORBIDDEN, ACCOUNT)?
            .declare(NOT_FOUND, ACCOUNT)?;

        registry
            .register_fn(VALIDATION, validation_failed)
            .register_fn(DUPLICATE_EMAIL, |_: &dyn Failure| {
                ComposedErrorResponse::new(
                    StatusCategory::UnprocessableEntity,
                    "email_unavailable",
                    "this email address cannot be used",
                )
            })
            .register_fn(INVALID_OR_EXPIRED_TOKEN, |_: &dyn Failure| {
                ComposedErrorResponse::new(
                    StatusCategory::BadRequest,
                    "invalid_or_expired_token",
                    "the link is invalid or has expired; request a new one",
                )
            })
            .register_fn(FORBIDDEN, |_: &dyn Failure| {
                ComposedErrorResponse::new(StatusCategory::Forbidden, "forbidden", "forbidden")
            })
            .register_fn(NOT_FOUND, |_: &dyn Failure| {
                ComposedErrorResponse::new(StatusCategory::NotFound, "not_found", "not found")
            });

        Ok(())
    }
}

fn validation_failed(failure: &dyn Failure) -> ComposedErrorResponse {
    let body = ComposedErrorResponse::new(
        StatusCategory::UnprocessableEntity,
        "validation_error",
        "one or more fields are invalid",
    );
    match failure.details() {
        Some(details) => body.with_details(details),
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::DomainError;
    use warden_errors::ErrorComposer;

    fn composer() -> ErrorComposer {
        ErrorComposer::from_modules(&[&AccountHandlerModule]).unwrap()
    }

    #[test]
    fn duplicate_email_uses_its_exact_handler() {
        let composer = composer();
        let candidates = composer.registry().candidates(&DUPLICATE_EMAIL);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].handles(), &VALIDATION);

        let body = composer.compose(&DomainError::DuplicateEmail);
        assert_eq!(body.error, "email_unavailable");
        assert_eq!(body.status.status_code(), 422);
        assert!(body.details.is_none());
    }

    #[test]
    fn validation_carries_field_details() {
        let body = composer().compose(&DomainError::validation("newEmail", "format"));
        assert_eq!(body.error, "validation_error");
        let details = body.details.unwrap();
        assert_eq!(details[0]["field"], "newEmail");
        assert_eq!(details[0]["code"], "format");
    }

    #[test]
    fn token_and_authorization_failures() {
        let composer = composer();
        let body = composer.compose(&DomainError::InvalidOrExpiredToken);
        assert_eq!(body.status, StatusCategory::BadRequest);

        let body = composer.compose(&DomainError::Forbidden);
        assert_eq!(body.status.status_code(), 403);

        let body = composer.compose(&DomainError::NotFound);
        assert_eq!(body.status.status_code(), 404);
    }

    #[test]
    fn internal_errors_fall_back_without_detail() {
        let body = composer().compose(&DomainError::internal("lock poisoned in user store"));
        assert_eq!(body, ComposedErrorResponse::internal_error());
    }

    #[test]
    fn module_registers_cleanly() {
        assert!(composer().registry().warnings().is_empty());
    }
}
