//! Domain foundation shared by the account crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult, FieldError, failure_types};
pub use id::UserId;
