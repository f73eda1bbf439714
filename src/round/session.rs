use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::models::PlayerRound;
use super::state::{RoundAction, RoundEffect, RoundState};
use crate::trivia::TriviaItem;

#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error("Submission rejected: {0}")]
    Rejected(String),

    #[error("Submission failed: {0}")]
    Unavailable(String),
}

/// Sends a finished round to the stats backend and returns its score.
#[async_trait]
pub trait RoundSubmitter: Send + Sync {
    async fn submit(&self, round: &PlayerRound) -> Result<u32, SubmitError>;
}

/// Drives a [`RoundState`] for the UI: applies actions and runs the
/// effects they produce.
#[derive(Clone)]
pub struct RoundSession {
    state: Arc<Mutex<RoundState>>,
    submitter: Arc<dyn RoundSubmitter>,
}

impl RoundSession {
    pub fn new(state: RoundState, submitter: Arc<dyn RoundSubmitter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            submitter,
        }
    }

    pub async fn snapshot(&self) -> RoundState {
        self.state.lock().await.clone()
    }

    pub async fn make_guess(&self, item: TriviaItem) {
        self.dispatch(RoundAction::MakeGuess(item)).await;
    }

    pub async fn use_hint(&self, hint_type: &str) {
        self.dispatch(RoundAction::UseHint(hint_type.to_string()))
            .await;
    }

    pub async fn give_up(&self) {
        self.dispatch(RoundAction::GiveUp).await;
    }

    pub async fn complete_reveal_sequence(&self) {
        self.dispatch(RoundAction::CompleteRevealSequence).await;
    }

    pub async fn clear_flash_message(&self) {
        self.dispatch(RoundAction::ClearFlashMessage).await;
    }

    /// Retries a submission that never reached the server.
    pub async fn sync(&self) {
        let pending = {
            let state = self.state.lock().await;
            state.needs_submission().then(|| state.round().clone())
        };
        if let Some(round) = pending {
            info!(round_id = %round.id, "Retrying pending round submission");
            self.submit(round).await;
        }
    }

    async fn dispatch(&self, action: RoundAction) {
        let effects = self.transition(action).await;
        for effect in effects {
            self.run_effect(effect).await;
        }
    }

    async fn transition(&self, action: RoundAction) -> Vec<RoundEffect> {
        let mut state = self.state.lock().await;
        let (next, effects) = state.clone().apply(action);
        *state = next;
        effects
    }

    async fn run_effect(&self, effect: RoundEffect) {
        match effect {
            RoundEffect::SubmitRound(round) => self.submit(round).await,
            RoundEffect::ScheduleResultModal(delay) => {
                let session = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    session.transition(RoundAction::ShowResultModal).await;
                });
            }
        }
    }

    /// Local state stays authoritative: a failed save only flags the round
    /// for a later [`RoundSession::sync`].
    #[instrument(skip(self, round), fields(round_id = %round.id))]
    async fn submit(&self, round: PlayerRound) {
        self.transition(RoundAction::SubmissionStarted).await;

        match self.submitter.submit(&round).await {
            Ok(score) => {
                info!(score, "Round saved");
                self.transition(RoundAction::SubmissionSucceeded { score })
                    .await;
            }
            Err(err) => {
                warn!(%err, "Failed to save round");
                self.transition(RoundAction::SubmissionFailed).await;
            }
        }
    }
}
