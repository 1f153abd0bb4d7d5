//! Infrastructure adapters for the account core: storage and code delivery.

pub mod notifier;
pub mod user_store;

pub use notifier::{RecordingNotifier, SentCode, TracingNotifier};
pub use user_store::InMemoryUserStore;
