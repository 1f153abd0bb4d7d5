use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission name evaluated by [`has_permission`](crate::has_permission).
///
/// The vocabulary is closed: anything other than the constants below is
/// denied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Modify the subject's profile (admin or self).
    pub const EDIT: Permission = Permission(Cow::Borrowed("edit"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
