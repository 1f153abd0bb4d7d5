//! Account lifecycle configuration.

use chrono::Duration;
use tracing::warn;

pub const CODE_TTL_ENV: &str = "WARDEN_CODE_TTL_SECS";

/// Longest accepted code lifetime (one year).
pub const MAX_CODE_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConfig {
    /// How long an issued code stays consumable.
    pub code_ttl: Duration,
    pub password_min: usize,
    pub password_max: usize,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::hours(24),
            password_min: 6,
            password_max: 30,
        }
    }
}

impl AccountConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or invalid values fall back
    /// to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(CODE_TTL_ENV) {
            let ttl = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| (1..=MAX_CODE_TTL_SECS).contains(secs))
                .and_then(Duration::try_seconds);

            match ttl {
                Some(ttl) => config.code_ttl = ttl,
                None => warn!(
                    key = CODE_TTL_ENV,
                    value = %raw,
                    "invalid code TTL; using default of {}s",
                    config.code_ttl.num_seconds()
                ),
            }
        }

        config
    }
}
