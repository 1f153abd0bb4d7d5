//! Derived security state for a (subject, viewer) pair.
//!
//! Everything here is a pure function of the records passed in:
//!
//! - No IO
//! - No panics
//! - No cached flags (role changes are visible on the very next call)

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use warden_core::{DomainError, DomainResult, UserId};

use crate::{Authority, CurrentViewerProvider, Permission, Role, User};

/// Flags recomputed for every request; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFlags {
    pub unverified: bool,
    pub blocked: bool,
    pub admin: bool,
    pub good_user: bool,
    pub good_admin: bool,
    /// Viewer may edit the subject's profile (good admin, or self).
    pub editable: bool,
    /// Viewer may change the subject's roles (good admin, not self).
    pub roles_editable: bool,
}

impl SecurityFlags {
    /// Standing derived from a role set alone; viewer-relative flags are false.
    pub fn from_roles(roles: &BTreeSet<Role>) -> Self {
        let unverified = roles.contains(&Role::UNVERIFIED);
        let blocked = roles.contains(&Role::BLOCKED);
        let admin = roles.contains(&Role::ADMIN);
        let good_user = !(unverified || blocked);

        Self {
            unverified,
            blocked,
            admin,
            good_user,
            good_admin: good_user && admin,
            editable: false,
            roles_editable: false,
        }
    }
}

/// A user record viewed through a particular viewer.
#[derive(Debug, Clone, Copy)]
pub struct DecoratedUser<'a> {
    subject: &'a User,
    flags: SecurityFlags,
}

impl<'a> DecoratedUser<'a> {
    pub fn subject(&self) -> &'a User {
        self.subject
    }

    pub fn flags(&self) -> SecurityFlags {
        self.flags
    }
}

/// Compute the derived flags for `subject` as seen by `viewer`.
///
/// An absent viewer (anonymous request) can neither edit nor change roles.
pub fn decorate<'a>(subject: &'a User, viewer: Option<&User>) -> DecoratedUser<'a> {
    let mut flags = SecurityFlags::from_roles(&subject.roles);

    if let Some(viewer) = viewer {
        let viewer_is_good_admin = SecurityFlags::from_roles(&viewer.roles).good_admin;
        let is_self = viewer.id == subject.id;
        flags.editable = viewer_is_good_admin || is_self;
        flags.roles_editable = viewer_is_good_admin && !is_self;
    }

    debug!(
        user_id = %subject.id,
        viewer_id = ?viewer.map(|v| v.id),
        editable = flags.editable,
        roles_editable = flags.roles_editable,
        "decorated user"
    );

    DecoratedUser { subject, flags }
}

/// [`decorate`] with the viewer taken from a provider.
pub fn decorate_current<'a, P>(subject: &'a User, provider: &P) -> DecoratedUser<'a>
where
    P: CurrentViewerProvider + ?Sized,
{
    let viewer = provider.current();
    decorate(subject, viewer.as_ref())
}

/// Authorities handed to the security layer: `ROLE_<role>` per role, plus
/// `ROLE_GOOD_USER` / `ROLE_GOOD_ADMIN` according to standing.
pub fn authorities(user: &DecoratedUser<'_>) -> BTreeSet<Authority> {
    let mut granted: BTreeSet<Authority> = user.subject.roles.iter().map(Authority::for_role).collect();

    if user.flags.good_user {
        granted.insert(Authority::GOOD_USER);
        if user.flags.good_admin {
            granted.insert(Authority::GOOD_ADMIN);
        }
    }

    granted
}

/// Whether `viewer` holds `permission` on `subject`. Unknown permissions are denied.
pub fn has_permission(subject: &User, viewer: Option<&User>, permission: &str) -> bool {
    let decorated = decorate(subject, viewer);

    let granted = match permission {
        p if p == Permission::EDIT.as_str() => decorated.flags.editable,
        _ => false,
    };

    debug!(
        user_id = %subject.id,
        permission,
        granted,
        "computed permission"
    );

    granted
}

/// Fail with `Forbidden` unless `viewer` may change `subject`'s roles.
pub fn ensure_roles_editable(subject: &User, viewer: Option<&User>) -> DomainResult<()> {
    if decorate(subject, viewer).flags.roles_editable {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Outward representation of a user.
///
/// Carries no password hash, codes or audit timestamps by construction;
/// email fields are present only when the viewer may edit the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,
    pub roles: BTreeSet<Role>,
    #[serde(flatten)]
    pub flags: SecurityFlags,
}

/// The only way a user record should leave the system boundary.
pub fn redact(user: &DecoratedUser<'_>) -> PublicUser {
    let editable = user.flags.editable;
    let subject = user.subject;

    PublicUser {
        id: subject.id,
        email: editable.then(|| subject.email.clone()),
        new_email: if editable { subject.new_email.clone() } else { None },
        roles: subject.roles.clone(),
        flags: user.flags,
    }
}
