//! Token-driven account lifecycle.
//!
//! Every consuming transition follows the same shape: check the supplied code
//! against the stored one, then hand the effect to the store's conditional
//! update so that the effect and the clearing of the code land together or
//! not at all.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use warden_core::{DomainError, DomainResult, UserId};

use crate::validation::{check_email, check_password, into_result, normalize_email};
use crate::{
    AccountConfig, CodePurpose, Notifier, PasswordHasher, Role, TokenIssuer, User, UserStore,
    authorize, ensure_roles_editable,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangeRequest {
    pub new_email: String,
    pub password: String,
}

/// Desired admin-controlled roles; `UNVERIFIED` is not part of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RoleUpdate {
    pub blocked: bool,
    pub admin: bool,
}

pub struct AccountWorkflow<S, N, H> {
    store: S,
    notifier: N,
    hasher: H,
    issuer: TokenIssuer,
    config: AccountConfig,
}

impl<S, N, H> AccountWorkflow<S, N, H>
where
    S: UserStore,
    N: Notifier,
    H: PasswordHasher,
{
    pub fn new(store: S, notifier: N, hasher: H, config: AccountConfig) -> Self {
        Self {
            store,
            notifier,
            hasher,
            issuer: TokenIssuer::new(config.code_ttl),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signup & verification
    // ─────────────────────────────────────────────────────────────────────────

    pub fn signup(&self, form: SignupForm, now: DateTime<Utc>) -> DomainResult<User> {
        let email = normalize_email(&form.email);
        into_result([
            check_email("email", &email),
            check_password(&self.config, "password", &form.password),
        ])?;

        if self.store.exists_by_email(&email)? {
            warn!("signup rejected: email unavailable");
            return Err(DomainError::DuplicateEmail);
        }

        let hash = self.hasher.hash(&form.password)?;
        let code = self.issuer.mint(now)?;
        let user = self
            .store
            .insert(User::new(UserId::new(), email, hash, code, now))?;

        info!(user_id = %user.id, "user signed up");
        self.notify(&user, CodePurpose::Verify);
        Ok(user)
    }

    /// Mint a fresh verification code, invalidating the previous one.
    pub fn resend_verification(
        &self,
        viewer: Option<&User>,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let user = self.store.load(user_id)?;
        if !authorize::decorate(&user, viewer).flags().editable {
            return Err(DomainError::Forbidden);
        }
        if !user.has_role(&Role::UNVERIFIED) {
            return Err(DomainError::validation("email", "already_verified"));
        }

        self.issue(user_id, CodePurpose::Verify, now, &mut |_| {})
    }

    pub fn verify(&self, user_id: UserId, token: &str, now: DateTime<Utc>) -> DomainResult<User> {
        self.consume(user_id, CodePurpose::Verify, token, now, &mut |user| {
            user.roles.remove(&Role::UNVERIFIED);
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Password reset
    // ─────────────────────────────────────────────────────────────────────────

    /// Unknown addresses succeed silently so the response reveals nothing.
    pub fn forgot_password(&self, email: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let email = normalize_email(email);
        match self.store.find_by_email(&email)? {
            Some(user) => self.issue(user.id, CodePurpose::ResetPassword, now, &mut |_| {}),
            None => {
                info!("password reset requested for unknown email");
                Ok(())
            }
        }
    }

    pub fn reset_password(
        &self,
        user_id: UserId,
        token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<User> {
        into_result([check_password(&self.config, "newPassword", new_password)])?;
        let hash = self.hasher.hash(new_password)?;

        self.consume(user_id, CodePurpose::ResetPassword, token, now, &mut |user| {
            user.password_hash = hash.clone();
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Email change
    // ─────────────────────────────────────────────────────────────────────────

    pub fn request_email_change(
        &self,
        viewer: Option<&User>,
        user_id: UserId,
        request: EmailChangeRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let user = self.store.load(user_id)?;
        if !authorize::decorate(&user, viewer).flags().editable {
            return Err(DomainError::Forbidden);
        }

        let new_email = normalize_email(&request.new_email);
        into_result([check_email("newEmail", &new_email)])?;

        if !self.hasher.verify(&request.password, &user.password_hash) {
            warn!(user_id = %user_id, "email change rejected: wrong password");
            return Err(DomainError::validation("password", "mismatch"));
        }
        if self.store.exists_by_email(&new_email)? {
            warn!(user_id = %user_id, "email change rejected: email unavailable");
            return Err(DomainError::DuplicateEmail);
        }

        self.issue(user_id, CodePurpose::ChangeEmail, now, &mut |user| {
            user.new_email = Some(new_email.clone());
        })
    }

    /// Confirm a staged email change. The store re-checks uniqueness, since
    /// another account may have taken the address after it was staged.
    pub fn change_email(
        &self,
        user_id: UserId,
        token: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<User> {
        self.consume(user_id, CodePurpose::ChangeEmail, token, now, &mut |user| {
            if let Some(new_email) = user.new_email.take() {
                user.email = new_email;
            }
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Admin
    // ─────────────────────────────────────────────────────────────────────────

    pub fn update_roles(
        &self,
        viewer: Option<&User>,
        user_id: UserId,
        update: RoleUpdate,
    ) -> DomainResult<User> {
        let subject = self.store.load(user_id)?;
        if let Err(err) = ensure_roles_editable(&subject, viewer) {
            warn!(user_id = %user_id, "role update rejected");
            return Err(err);
        }

        let user = self.store.update(user_id, &mut |user| {
            toggle(&mut user.roles, Role::BLOCKED, update.blocked);
            toggle(&mut user.roles, Role::ADMIN, update.admin);
        })?;

        info!(
            user_id = %user_id,
            blocked = update.blocked,
            admin = update.admin,
            "roles updated"
        );
        Ok(user)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Overwrite the code for `purpose` (plus any staged fields) and notify.
    fn issue(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
        now: DateTime<Utc>,
        stage: &mut dyn FnMut(&mut User),
    ) -> DomainResult<()> {
        let code = self.issuer.mint(now)?;
        let user = self.store.update(user_id, &mut |user| {
            stage(user);
            *user.code_mut(purpose) = Some(code.clone());
        })?;

        info!(user_id = %user_id, purpose = %purpose, "code issued");
        self.notify(&user, purpose);
        Ok(())
    }

    fn consume(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
        token: &str,
        now: DateTime<Utc>,
        effect: &mut dyn FnMut(&mut User),
    ) -> DomainResult<User> {
        let user = self.store.load(user_id).map_err(|err| match err {
            DomainError::NotFound => DomainError::InvalidOrExpiredToken,
            other => other,
        })?;

        if let Err(err) = self.issuer.consume(user.code(purpose), token, now) {
            warn!(user_id = %user_id, purpose = %purpose, "code rejected");
            return Err(err);
        }

        let committed = self
            .store
            .compare_and_update(user_id, purpose, token, &mut |user| {
                effect(user);
                *user.code_mut(purpose) = None;
            })?;

        let Some(user) = committed else {
            warn!(user_id = %user_id, purpose = %purpose, "code consumed concurrently");
            return Err(DomainError::InvalidOrExpiredToken);
        };

        info!(user_id = %user_id, purpose = %purpose, version = user.version, "code consumed");
        Ok(user)
    }

    fn notify(&self, user: &User, purpose: CodePurpose) {
        let recipient = match purpose {
            CodePurpose::ChangeEmail => user.new_email.as_deref().unwrap_or(&user.email),
            _ => user.email.as_str(),
        };
        let Some(code) = user.code(purpose) else {
            return;
        };

        if let Err(err) = self.notifier.send_code(recipient, purpose, &code.token) {
            warn!(
                user_id = %user.id,
                purpose = %purpose,
                error = %err,
                "failed to deliver code; it stays valid for a resend"
            );
        }
    }
}

fn toggle(roles: &mut std::collections::BTreeSet<Role>, role: Role, on: bool) {
    if on {
        roles.insert(role);
    } else {
        roles.remove(&role);
    }
}
