//! Input validation shared by signup and the lifecycle workflows.

use warden_core::{DomainError, DomainResult, FieldError};

use crate::AccountConfig;
use crate::user::{EMAIL_MAX, EMAIL_MIN};

/// Canonical form used for storage and uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check an already-normalized email address, reporting under `field`.
pub fn check_email(field: &str, email: &str) -> Option<FieldError> {
    let len = email.chars().count();
    if !(EMAIL_MIN..=EMAIL_MAX).contains(&len) {
        return Some(FieldError::new(field, "length"));
    }

    let mut parts = email.split('@');
    let well_formed = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    };

    if well_formed {
        None
    } else {
        Some(FieldError::new(field, "format"))
    }
}

pub fn check_password(config: &AccountConfig, field: &str, password: &str) -> Option<FieldError> {
    let len = password.chars().count();
    if (config.password_min..=config.password_max).contains(&len) {
        None
    } else {
        Some(FieldError::new(field, "length"))
    }
}

/// Turn collected field errors into a result.
pub fn into_result(errors: impl IntoIterator<Item = Option<FieldError>>) -> DomainResult<()> {
    let errors: Vec<FieldError> = errors.into_iter().flatten().collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(check_email("email", "a@b.c").is_none());
        assert!(check_email("email", "alice@example.com").is_none());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["invalid-email", "@example.com", "alice@", "a@b@c.d", "al ice@example.com"] {
            let err = check_email("email", bad).unwrap();
            assert_eq!(err.code, "format", "{bad}");
        }
    }

    #[test]
    fn enforces_length_bounds() {
        assert_eq!(check_email("email", "a@b").unwrap().code, "length");
        let long = format!("{}@example.com", "a".repeat(EMAIL_MAX));
        assert_eq!(check_email("newEmail", &long).unwrap().field, "newEmail");
    }

    #[test]
    fn password_bounds_come_from_config() {
        let config = AccountConfig::default();
        assert!(check_password(&config, "password", "secret").is_none());
        assert!(check_password(&config, "password", "short").is_some());
        assert!(check_password(&config, "password", &"x".repeat(31)).is_some());
    }

    #[test]
    fn into_result_collects_every_error() {
        let err = into_result([
            Some(FieldError::new("email", "format")),
            None,
            Some(FieldError::new("password", "length")),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref f) if f.len() == 2));
        assert!(into_result([None, None]).is_ok());
    }
}
