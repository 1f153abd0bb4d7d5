//! Account authorization and token-driven lifecycle.
//!
//! This crate knows nothing of HTTP or storage: persistence,
//! delivery and hashing are reached through the traits in [`ports`], and the
//! acting viewer is always passed in explicitly.

pub mod authorize;
pub mod config;
pub mod handlers;
pub mod permissions;
pub mod ports;
pub mod roles;
pub mod token;
pub mod user;
pub mod validation;
pub mod workflow;

pub use authorize::{
    DecoratedUser, PublicUser, SecurityFlags, authorities, decorate, decorate_current,
    ensure_roles_editable, has_permission, redact,
};
pub use config::AccountConfig;
pub use handlers::AccountHandlerModule;
pub use permissions::Permission;
pub use ports::{CurrentViewerProvider, FixedViewer, Notifier, PasswordHasher, UserStore};
pub use roles::{Authority, Role};
pub use token::{CodePurpose, PendingCode, Token, TokenIssuer};
pub use user::{PasswordHash, User};
pub use workflow::{AccountWorkflow, EmailChangeRequest, RoleUpdate, SignupForm};
