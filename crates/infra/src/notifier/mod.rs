//! `Notifier` adapters.
//!
//! Neither adapter writes the token itself to the log.

use std::sync::Mutex;

use anyhow::anyhow;
use tracing::info;

use warden_auth::{CodePurpose, Notifier, Token};

/// Logs each delivery request. Useful in development, where no mail relay is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send_code(&self, email: &str, purpose: CodePurpose, _token: &Token) -> anyhow::Result<()> {
        info!(email, purpose = %purpose, "code delivery requested");
        Ok(())
    }
}

/// One captured delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCode {
    pub email: String,
    pub purpose: CodePurpose,
    pub token: Token,
}

/// Captures deliveries in memory so tests can act as the recipient.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentCode>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentCode> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Most recent token delivered to `email` for `purpose`.
    pub fn last_token(&self, email: &str, purpose: CodePurpose) -> Option<Token> {
        self.sent()
            .into_iter()
            .rev()
            .find(|s| s.email == email && s.purpose == purpose)
            .map(|s| s.token)
    }
}

impl Notifier for RecordingNotifier {
    fn send_code(&self, email: &str, purpose: CodePurpose, token: &Token) -> anyhow::Result<()> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| anyhow!("recording notifier lock poisoned"))?;
        sent.push(SentCode {
            email: email.to_string(),
            purpose,
            token: token.clone(),
        });
        Ok(())
    }
}
