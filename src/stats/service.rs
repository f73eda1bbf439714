use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    repository::{PlayerWrite, StatsRepository},
    transaction::{AtomicUpdater, RetryPolicy, Update},
    GameHistoryEntry, PlayerStats, RoundRecord, StatsError, SubmitRoundResponse,
};
use crate::difficulty;
use crate::round::{calculate_score, resolve_date_id, PlayerRound, RoundSubmitter, SubmitError};

/// Behaviour switches for round submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionOptions {
    /// Answer a resubmitted, already processed round with its stored score
    /// instead of counting it again.
    pub dedupe_processed_rounds: bool,
}

/// Folds finished rounds into durable player statistics.
pub struct StatsService {
    repository: Arc<dyn StatsRepository>,
    updater: AtomicUpdater,
    options: SubmissionOptions,
}

impl StatsService {
    pub fn new(
        repository: Arc<dyn StatsRepository>,
        policy: RetryPolicy,
        options: SubmissionOptions,
    ) -> Self {
        Self {
            updater: AtomicUpdater::new(repository.clone(), policy),
            repository,
            options,
        }
    }

    /// Validates ownership, scores the round and updates the player's stats,
    /// round record and history in one transaction.
    #[instrument(skip(self, round), fields(round_id = %round.id, player_id = %round.player_id))]
    pub async fn submit_round(
        &self,
        round: PlayerRound,
        requester_id: Option<&str>,
    ) -> Result<SubmitRoundResponse, StatsError> {
        let requester_id = requester_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                warn!("Rejecting unauthenticated round submission");
                StatsError::Unauthenticated
            })?;

        if requester_id != round.player_id {
            warn!(requester_id, "Rejecting round submitted for another player");
            return Err(StatsError::PermissionDenied);
        }

        validate_round(&round)?;

        let score = calculate_score(&round);
        let hints_spent = spent_hint_count(&round);
        let date_id = resolve_date_id(round.start_date.as_ref(), Utc::now());
        let dedupe = self.options.dedupe_processed_rounds;
        let player_id = round.player_id.clone();

        let score = self
            .updater
            .atomic_update(&player_id, &round.id, |snapshot| {
                if dedupe {
                    if let Some(existing) = snapshot.round.as_ref().filter(|r| r.round.stats_processed) {
                        info!(score = existing.score, "Round already processed, skipping");
                        return Ok(Update::Skip(existing.score));
                    }
                }

                let mut stats = snapshot
                    .stats
                    .clone()
                    .unwrap_or_else(|| PlayerStats::new(&player_id));
                stats.record_round(round.correct_answer, round.guess_count(), score);
                stats.spend_hints(hints_spent);

                let mut stored = round.clone();
                stored.stats_processed = true;

                let write = PlayerWrite {
                    stats,
                    history: GameHistoryEntry::from_round(&round, &date_id, score, Utc::now()),
                    round: RoundRecord {
                        round: stored,
                        score,
                    },
                };
                Ok(Update::Write(write, score))
            })
            .await?;

        info!(score, %date_id, won = round.correct_answer, "Round folded into player stats");

        Ok(SubmitRoundResponse {
            success: true,
            score,
        })
    }

    /// Stored stats, or fresh defaults for a player who has not finished a round.
    pub async fn get_player_stats(&self, player_id: &str) -> Result<PlayerStats, StatsError> {
        Ok(self
            .repository
            .get_player_stats(player_id)
            .await?
            .unwrap_or_else(|| PlayerStats::new(player_id)))
    }

    pub async fn list_history(&self, player_id: &str) -> Result<Vec<GameHistoryEntry>, StatsError> {
        self.repository.list_history(player_id).await
    }

    pub async fn get_round(
        &self,
        player_id: &str,
        round_id: &str,
    ) -> Result<Option<RoundRecord>, StatsError> {
        self.repository.get_round(player_id, round_id).await
    }
}

fn validate_round(round: &PlayerRound) -> Result<(), StatsError> {
    let invalid = |reason: String| {
        warn!(%reason, "Rejecting malformed round");
        Err(StatsError::Validation(reason))
    };

    if round.id.trim().is_empty() {
        return invalid("round id is required".to_string());
    }
    if round.guesses_max == 0 {
        return invalid("guessesMax must be at least 1".to_string());
    }
    if round.guess_count() > round.guesses_max as usize {
        return invalid(format!(
            "{} guesses exceed the allowance of {}",
            round.guess_count(),
            round.guesses_max
        ));
    }
    // Unknown levels still go through and score 0.
    if let Ok(mode) = difficulty::lookup(&round.difficulty) {
        if mode.guesses_max != round.guesses_max {
            return invalid(format!(
                "{} allows {} guesses, round claims {}",
                round.difficulty, mode.guesses_max, round.guesses_max
            ));
        }
    }
    if !round.is_finished() {
        return invalid("round is not finished".to_string());
    }
    Ok(())
}

/// Hints the player paid for. Free reveals on other levels cost nothing.
fn spent_hint_count(round: &PlayerRound) -> u32 {
    match difficulty::lookup(&round.difficulty) {
        Ok(mode) if mode.level.penalizes_spent_hints() => {
            u32::try_from(round.hints_used.len()).unwrap_or(u32::MAX)
        }
        _ => 0,
    }
}

/// Submits rounds straight to a [`StatsService`] in the same process.
pub struct InProcessSubmitter {
    service: Arc<StatsService>,
    requester_id: Option<String>,
}

impl InProcessSubmitter {
    pub fn new(service: Arc<StatsService>, requester_id: Option<String>) -> Self {
        Self {
            service,
            requester_id,
        }
    }
}

#[async_trait]
impl RoundSubmitter for InProcessSubmitter {
    async fn submit(&self, round: &PlayerRound) -> Result<u32, SubmitError> {
        self.service
            .submit_round(round.clone(), self.requester_id.as_deref())
            .await
            .map(|response| response.score)
            .map_err(|err| {
                if err.is_permanent() {
                    SubmitError::Rejected(err.to_string())
                } else {
                    SubmitError::Unavailable(err.to_string())
                }
            })
    }
}
