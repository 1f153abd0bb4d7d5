use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role tag stored on a user record.
///
/// Roles are opaque strings; only the three canonical tags below carry
/// meaning for account standing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Account has not confirmed its email address yet.
    pub const UNVERIFIED: Role = Role(Cow::Borrowed("UNVERIFIED"));
    /// Account was blocked by an administrator.
    pub const BLOCKED: Role = Role(Cow::Borrowed("BLOCKED"));
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Granted authority handed to the surrounding security layer (`ROLE_<name>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(Cow<'static, str>);

impl Authority {
    /// Synthetic authority for a user that is neither unverified nor blocked.
    pub const GOOD_USER: Authority = Authority(Cow::Borrowed("ROLE_GOOD_USER"));
    /// Synthetic authority for a good user that also holds `ADMIN`.
    pub const GOOD_ADMIN: Authority = Authority(Cow::Borrowed("ROLE_GOOD_ADMIN"));

    pub fn for_role(role: &Role) -> Self {
        Self(Cow::Owned(format!("ROLE_{}", role.as_str())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
