//! Failure-to-response composition.
//!
//! Handlers are contributed by pluggable [`HandlerModule`]s at startup and
//! keyed by a runtime failure type hierarchy. For each failure the
//! [`ErrorComposer`] picks the handler with the most specific declared type
//! and falls back to a detail-free internal error when nothing matches.

pub mod composer;
pub mod failure;
pub mod handler;
pub mod hierarchy;
pub mod registry;
pub mod response;

pub use composer::ErrorComposer;
pub use failure::{Failure, FailureType};
pub use handler::{ErrorHandler, FnHandler, HandlerModule};
pub use hierarchy::{HierarchyError, TypeHierarchy};
pub use registry::{HandlerRegistry, HandlerRegistryBuilder, RegistrationWarning};
pub use response::{ComposedErrorResponse, StatusCategory};
