//! Collaborator boundaries consumed by the account core.
//!
//! All ports are synchronous and `Send + Sync`; adapters that talk to a
//! database or a mail relay do their own blocking or spawning.

use std::sync::Arc;

use warden_core::{DomainResult, UserId};

use crate::{CodePurpose, PasswordHash, Token, User};

/// Persistence boundary for user records.
///
/// ## Implementation Requirements
///
/// - Email uniqueness is enforced on every write; a write that would
///   duplicate another account's email fails with `DuplicateEmail` and
///   applies nothing.
/// - Every successful write bumps `User::version` and `last_modified_at`.
/// - `compare_and_update` is atomic: comparing the stored code for `purpose`
///   with `expected` and applying `mutator` happen under one exclusive
///   section per user, so that of two racing calls with the same code at
///   most one returns `Some`.
pub trait UserStore: Send + Sync {
    fn insert(&self, user: User) -> DomainResult<User>;

    /// Fails with `NotFound` for unknown ids.
    fn load(&self, id: UserId) -> DomainResult<User>;

    /// Lookup by normalized email.
    fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        Ok(self.find_by_email(email)?.is_some())
    }

    /// Unconditionally apply `mutator` and persist the result.
    fn update(&self, id: UserId, mutator: &mut dyn FnMut(&mut User)) -> DomainResult<User>;

    /// Apply `mutator` only if the code stored for `purpose` equals `expected`.
    ///
    /// Returns the committed record, or `Ok(None)` when the code is unset or
    /// differs.
    fn compare_and_update(
        &self,
        id: UserId,
        purpose: CodePurpose,
        expected: &str,
        mutator: &mut dyn FnMut(&mut User),
    ) -> DomainResult<Option<User>>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn insert(&self, user: User) -> DomainResult<User> {
        (**self).insert(user)
    }

    fn load(&self, id: UserId) -> DomainResult<User> {
        (**self).load(id)
    }

    fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        (**self).find_by_email(email)
    }

    fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        (**self).exists_by_email(email)
    }

    fn update(&self, id: UserId, mutator: &mut dyn FnMut(&mut User)) -> DomainResult<User> {
        (**self).update(id, mutator)
    }

    fn compare_and_update(
        &self,
        id: UserId,
        purpose: CodePurpose,
        expected: &str,
        mutator: &mut dyn FnMut(&mut User),
    ) -> DomainResult<Option<User>> {
        (**self).compare_and_update(id, purpose, expected, mutator)
    }
}

/// Delivers codes to users (mail, SMS, ...).
///
/// Fire-and-forget from the core's point of view: a delivery failure is
/// logged and never rolls back the stored code.
pub trait Notifier: Send + Sync {
    fn send_code(&self, email: &str, purpose: CodePurpose, token: &Token) -> anyhow::Result<()>;
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn send_code(&self, email: &str, purpose: CodePurpose, token: &Token) -> anyhow::Result<()> {
        (**self).send_code(email, purpose, token)
    }
}

/// Password hashing primitive (choice of algorithm is the embedder's).
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> DomainResult<PasswordHash>;

    fn verify(&self, plain: &str, hash: &PasswordHash) -> bool;
}

impl<H> PasswordHasher for Arc<H>
where
    H: PasswordHasher + ?Sized,
{
    fn hash(&self, plain: &str) -> DomainResult<PasswordHash> {
        (**self).hash(plain)
    }

    fn verify(&self, plain: &str, hash: &PasswordHash) -> bool {
        (**self).verify(plain, hash)
    }
}

/// Supplies the acting principal for a request.
pub trait CurrentViewerProvider {
    /// `None` for anonymous requests.
    fn current(&self) -> Option<User>;
}

/// A viewer resolved once per request and passed along explicitly.
#[derive(Debug, Clone, Default)]
pub struct FixedViewer(Option<User>);

impl FixedViewer {
    pub fn new(viewer: Option<User>) -> Self {
        Self(viewer)
    }

    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn viewer(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

impl CurrentViewerProvider for FixedViewer {
    fn current(&self) -> Option<User> {
        self.0.clone()
    }
}
