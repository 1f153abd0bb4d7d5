//! Process-wide tracing setup shared by every binary embedding the account core.

pub mod tracing;

pub use self::tracing::{LogFormat, init, init_with};
