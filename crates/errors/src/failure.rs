use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Name of a failure type in the runtime hierarchy.
///
/// Failure types are opaque strings at this layer; their parent relations
/// are declared on a [`TypeHierarchy`](crate::TypeHierarchy) by whichever
/// module owns them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureType(Cow<'static, str>);

impl FailureType {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for FailureType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A failure that can be handed to the [`ErrorComposer`](crate::ErrorComposer).
pub trait Failure: std::error::Error + Send + Sync + 'static {
    /// Concrete (most specific) type of this failure instance.
    fn failure_type(&self) -> FailureType;

    /// Structured, client-safe details a handler may attach to the response.
    fn details(&self) -> Option<serde_json::Value> {
        None
    }
}
