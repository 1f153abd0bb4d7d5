//! Single-use opaque codes for verification, password reset and email change.
//!
//! A code knows nothing about its purpose; purpose is which slot on the
//! [`User`](crate::User) it is stored in. Issuing a code for a purpose
//! overwrites whatever was in that slot.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_core::{DomainError, DomainResult};

/// Length of every minted token (hyphenated UUID).
pub const TOKEN_LEN: usize = 36;

/// Which workflow a code drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePurpose {
    Verify,
    ResetPassword,
    ChangeEmail,
}

impl CodePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            CodePurpose::Verify => "verify",
            CodePurpose::ResetPassword => "reset_password",
            CodePurpose::ChangeEmail => "change_email",
        }
    }
}

impl core::fmt::Display for CodePurpose {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque token value. `Debug` is redacted and there is no `Serialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// A stored code together with its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCode {
    pub token: Token,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingCode {
    /// Whether `now` falls inside `[issued_at, expires_at)`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.issued_at <= now && now < self.expires_at
    }
}

/// Mints and checks codes.
#[derive(Debug, Clone, Copy)]
pub struct TokenIssuer {
    ttl: Duration,
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}

impl TokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a fresh random code valid from `now` for the configured TTL.
    pub fn mint(&self, now: DateTime<Utc>) -> DomainResult<PendingCode> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| DomainError::internal("code expiry is out of range"))?;

        Ok(PendingCode {
            token: Token(Uuid::new_v4().hyphenated().to_string()),
            issued_at: now,
            expires_at,
        })
    }

    /// Check `supplied` against the stored code.
    ///
    /// Unset, mismatching and expired codes all fail with the same
    /// [`DomainError::InvalidOrExpiredToken`], and the comparison runs over
    /// the full token regardless of where the first difference is. The caller
    /// must clear the slot atomically on success.
    pub fn consume(
        &self,
        stored: Option<&PendingCode>,
        supplied: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let (expected, live) = match stored {
            Some(code) => (code.token.as_str(), code.is_live(now)),
            None => (UNSET_PLACEHOLDER, false),
        };

        let matches = constant_time_eq(expected.as_bytes(), supplied.as_bytes());

        if matches & live {
            Ok(())
        } else {
            Err(DomainError::InvalidOrExpiredToken)
        }
    }
}

// Compared against when the slot is empty so both paths do the same work.
const UNSET_PLACEHOLDER: &str = "00000000-0000-0000-0000-000000000000";

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = u8::from(a.len() != b.len());
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_tokens_are_36_chars_and_distinct() {
        let issuer = TokenIssuer::default();
        let now = Utc::now();
        let a = issuer.mint(now).unwrap();
        let b = issuer.mint(now).unwrap();
        assert_eq!(a.token.as_str().len(), TOKEN_LEN);
        assert_ne!(a.token, b.token);
        assert_eq!(a.expires_at - a.issued_at, Duration::hours(24));
    }

    #[test]
    fn mint_reports_out_of_range_expiry() {
        let issuer = TokenIssuer::new(Duration::days(365 * 1_000_000));
        let err = issuer.mint(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn matching_live_code_is_accepted() {
        let issuer = TokenIssuer::default();
        let now = Utc::now();
        let code = issuer.mint(now).unwrap();
        let supplied = code.token.as_str().to_string();
        assert!(issuer.consume(Some(&code), &supplied, now).is_ok());
    }

    #[test]
    fn mismatch_unset_and_expired_fail_identically() {
        let issuer = TokenIssuer::new(Duration::minutes(5));
        let now = Utc::now();
        let code = issuer.mint(now).unwrap();
        let good = code.token.as_str().to_string();
        let other = issuer.mint(now).unwrap().token.as_str().to_string();

        let mismatch = issuer.consume(Some(&code), &other, now).unwrap_err();
        let unset = issuer.consume(None, &good, now).unwrap_err();
        let expired = issuer
            .consume(Some(&code), &good, now + Duration::minutes(5))
            .unwrap_err();

        assert_eq!(mismatch, DomainError::InvalidOrExpiredToken);
        assert_eq!(unset, mismatch);
        assert_eq!(expired, mismatch);
    }

    #[test]
    fn prefix_or_empty_token_is_rejected() {
        let issuer = TokenIssuer::default();
        let now = Utc::now();
        let code = issuer.mint(now).unwrap();
        let prefix = &code.token.as_str()[..10];
        assert!(issuer.consume(Some(&code), prefix, now).is_err());
        assert!(issuer.consume(Some(&code), "", now).is_err());
        assert!(issuer.consume(None, UNSET_PLACEHOLDER, now).is_err());
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hello_world"));
        assert!(!constant_time_eq(b"", b"\0"));
    }
}
