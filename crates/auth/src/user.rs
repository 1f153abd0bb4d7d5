//! User record as persisted by the store.
//!
//! Only the fields the authorization and lifecycle rules need live here.
//! Derived standing (verified, blocked, admin, ...) is never stored; see
//! [`crate::authorize`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use warden_core::UserId;

use crate::{CodePurpose, PendingCode, Role};

pub const EMAIL_MIN: usize = 4;
pub const EMAIL_MAX: usize = 250;

// ─────────────────────────────────────────────────────────────────────────────
// Password hash
// ─────────────────────────────────────────────────────────────────────────────

/// Encoded password hash produced by a [`PasswordHasher`](crate::PasswordHasher).
///
/// Deliberately not `Serialize`; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A user account.
///
/// # Invariants
/// - `email` is unique across accounts (enforced by the store).
/// - Every set code is unique across accounts while set; at most one code per
///   purpose is in flight, and issuing a new one overwrites the old.
/// - `new_email` is set exactly while an email change is pending.
#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: PasswordHash,
    pub roles: BTreeSet<Role>,
    pub verification_code: Option<PendingCode>,
    pub forgot_password_code: Option<PendingCode>,
    pub change_email_code: Option<PendingCode>,
    pub new_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub version: u64,
}

impl User {
    /// A freshly signed-up account: `UNVERIFIED`, with its first verification code.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        password_hash: PasswordHash,
        verification_code: PendingCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash,
            roles: BTreeSet::from([Role::UNVERIFIED]),
            verification_code: Some(verification_code),
            forgot_password_code: None,
            change_email_code: None,
            new_email: None,
            created_at: now,
            last_modified_at: now,
            version: 0,
        }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Login identifier; the email address.
    pub fn username(&self) -> &str {
        &self.email
    }

    /// The code currently stored for `purpose`, if any.
    pub fn code(&self, purpose: CodePurpose) -> Option<&PendingCode> {
        match purpose {
            CodePurpose::Verify => self.verification_code.as_ref(),
            CodePurpose::ResetPassword => self.forgot_password_code.as_ref(),
            CodePurpose::ChangeEmail => self.change_email_code.as_ref(),
        }
    }

    pub fn code_mut(&mut self, purpose: CodePurpose) -> &mut Option<PendingCode> {
        match purpose {
            CodePurpose::Verify => &mut self.verification_code,
            CodePurpose::ResetPassword => &mut self.forgot_password_code,
            CodePurpose::ChangeEmail => &mut self.change_email_code,
        }
    }
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username())
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenIssuer;

    fn sample() -> User {
        let now = Utc::now();
        let code = TokenIssuer::default().mint(now).unwrap();
        User::new(
            UserId::new(),
            "alice@example.com",
            PasswordHash::new("hash:alice-secret"),
            code,
            now,
        )
    }

    #[test]
    fn new_user_is_unverified_with_a_code() {
        let user = sample();
        assert!(user.has_role(&Role::UNVERIFIED));
        assert_eq!(user.roles.len(), 1);
        assert!(user.code(CodePurpose::Verify).is_some());
        assert!(user.code(CodePurpose::ResetPassword).is_none());
        assert!(user.new_email.is_none());
        assert_eq!(user.username(), "alice@example.com");
    }

    #[test]
    fn code_mut_targets_the_purpose_slot() {
        let mut user = sample();
        let code = TokenIssuer::default().mint(Utc::now()).unwrap();
        *user.code_mut(CodePurpose::ChangeEmail) = Some(code.clone());
        assert_eq!(user.change_email_code.as_ref(), Some(&code));
        assert!(user.forgot_password_code.is_none());
    }

    #[test]
    fn debug_hides_secrets() {
        let user = sample();
        let rendered = format!("{user:?}");
        assert!(rendered.contains("alice@example.com"));
        assert!(!rendered.contains("alice-secret"));
        let token = user.verification_code.as_ref().unwrap().token.as_str().to_string();
        assert!(!rendered.contains(&token));
    }
}
