use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::repository::{PlayerSnapshot, PlayerWrite, StatsRepository};
use super::StatsError;

/// Backoff for retried stats transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries including the first. Always at least 2.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(2),
            base_delay,
            ..Self::default()
        }
    }

    /// Exponential delay before retry number `attempt` (1-based), capped,
    /// plus up to 50% jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let backoff = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        let jitter_ceiling = backoff.as_millis() as u64 / 2;
        let jitter = if jitter_ceiling == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ceiling)
        };
        backoff + Duration::from_millis(jitter)
    }
}

/// Result of a transaction body.
pub enum Update<T> {
    /// Commit these documents and return the value.
    Write(PlayerWrite, T),
    /// Nothing to write.
    Skip(T),
}

/// Read-modify-write over one player's documents with optimistic
/// concurrency: the body is re-run on a fresh snapshot after every conflict.
#[derive(Clone)]
pub struct AtomicUpdater {
    repository: Arc<dyn StatsRepository>,
    policy: RetryPolicy,
}

impl AtomicUpdater {
    pub fn new(repository: Arc<dyn StatsRepository>, policy: RetryPolicy) -> Self {
        Self { repository, policy }
    }

    pub async fn atomic_update<T, F>(
        &self,
        player_id: &str,
        round_id: &str,
        mut body: F,
    ) -> Result<T, StatsError>
    where
        F: FnMut(&PlayerSnapshot) -> Result<Update<T>, StatsError> + Send,
        T: Send,
    {
        let max_attempts = self.policy.max_attempts.max(2);

        for attempt in 1..=max_attempts {
            let snapshot = self.repository.read_snapshot(player_id, round_id).await?;

            let (write, value) = match body(&snapshot)? {
                Update::Skip(value) => return Ok(value),
                Update::Write(write, value) => (write, value),
            };

            match self
                .repository
                .commit(player_id, snapshot.version, write)
                .await
            {
                Ok(version) => {
                    debug!(player_id, attempt, version, "Stats transaction committed");
                    return Ok(value);
                }
                Err(StatsError::WriteConflict(_)) if attempt < max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        player_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Stats transaction conflicted, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(StatsError::WriteConflict(_)) => break,
                Err(err) => return Err(err),
            }
        }

        warn!(player_id, attempts = max_attempts, "Stats transaction contention exhausted");
        Err(StatsError::ContentionExhausted {
            attempts: max_attempts,
        })
    }
}
