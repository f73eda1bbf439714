use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::auth::TokenConfig;
use crate::stats::{RetryPolicy, SubmissionOptions};

const DEV_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Server configuration loaded from environment variables.
///
/// | Env Var                   | Default                     |
/// |---------------------------|-----------------------------|
/// | `HOST`                    | `0.0.0.0`                   |
/// | `PORT`                    | `3000`                      |
/// | `JWT_SECRET`              | development secret          |
/// | `TOKEN_EXPIRATION_DAYS`   | `365`                       |
/// | `DATABASE_URL`            | unset, in-memory store      |
/// | `STATS_TX_MAX_ATTEMPTS`   | `5` (at least 2)            |
/// | `STATS_TX_BASE_DELAY_MS`  | `20`                        |
/// | `DEDUPE_PROCESSED_ROUNDS` | `false`                     |
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_expiration_days: i64,
    pub database_url: Option<String>,
    pub stats_tx_max_attempts: u32,
    pub stats_tx_base_delay_ms: u64,
    pub dedupe_processed_rounds: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed(&lookup, "PORT", 3000),
            jwt_secret,
            token_expiration_days: parsed(&lookup, "TOKEN_EXPIRATION_DAYS", 365),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            stats_tx_max_attempts: parsed(&lookup, "STATS_TX_MAX_ATTEMPTS", 5u32).max(2),
            stats_tx_base_delay_ms: parsed(&lookup, "STATS_TX_BASE_DELAY_MS", 20),
            dedupe_processed_rounds: parsed(&lookup, "DEDUPE_PROCESSED_ROUNDS", false),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.stats_tx_max_attempts,
            Duration::from_millis(self.stats_tx_base_delay_ms),
        )
    }

    pub fn submission_options(&self) -> SubmissionOptions {
        SubmissionOptions {
            dedupe_processed_rounds: self.dedupe_processed_rounds,
        }
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.jwt_secret.clone(), self.token_expiration_days)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, ?default, "Invalid config value, using default");
            default
        }),
    }
}
