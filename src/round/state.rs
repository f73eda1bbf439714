use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::feedback::{generate_implicit_hint, NOT_QUITE_FEEDBACK};
use super::models::{Guess, PlayerRound};
use crate::difficulty::{DifficultyError, DifficultyLevel, HintStrategy};
use crate::trivia::{GameMode, Hint, Identifier, TriviaItem};

/// Pause between the end of the reveal and the result modal.
pub const RESULT_MODAL_DELAY: Duration = Duration::from_millis(500);
pub const SAVE_FAILED_MESSAGE: &str = "Could not save progress. Check connection.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error(transparent)]
    Difficulty(#[from] DifficultyError),
    #[error("Hint type {0} appears more than once on the target item")]
    DuplicateHintType(String),
    #[error("Round must allow at least one guess")]
    ZeroGuessAllowance,
    #[error("Round targets item {round} but was given item {target}")]
    TargetMismatch { round: String, target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundStatus {
    Active,
    RevealSequence,
    GameOver,
}

/// Where the finished round is in its trip to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum SubmissionStatus {
    NotSubmitted,
    InFlight,
    Saved { score: u32 },
    /// Saved by an earlier session; the score lives on the server.
    Recorded,
    Failed,
}

/// What the guess row shows for the most recent guess.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastGuessResult {
    pub item_id: Identifier,
    pub correct: bool,
    pub feedback: Option<String>,
    pub hint_info: Option<Vec<Hint>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundAction {
    MakeGuess(TriviaItem),
    UseHint(String),
    GiveUp,
    CompleteRevealSequence,
    ShowResultModal,
    SubmissionStarted,
    SubmissionSucceeded { score: u32 },
    SubmissionFailed,
    ClearFlashMessage,
}

/// Side effects the driver must carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEffect {
    SubmitRound(PlayerRound),
    ScheduleResultModal(Duration),
}

/// All client-side state of one round. Transitions consume the old value
/// and hand back a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    round: PlayerRound,
    target: TriviaItem,
    level: DifficultyLevel,
    status: RoundStatus,
    last_guess_result: Option<LastGuessResult>,
    hints_available: u32,
    hints_used_count: u32,
    show_result_modal: bool,
    flash_message: Option<String>,
    submission: SubmissionStatus,
}

impl RoundState {
    /// Starts a fresh round against `target`.
    pub fn start(
        player_id: &str,
        level: DifficultyLevel,
        target: TriviaItem,
        game_mode: GameMode,
        hints_available: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, RoundError> {
        let round = PlayerRound::new(
            Uuid::new_v4().to_string(),
            player_id.to_string(),
            level,
            target.summary(),
            game_mode,
            started_at,
        );
        Self::resume(round, target, hints_available)
    }

    /// Rebuilds state around a round loaded from storage.
    pub fn resume(
        round: PlayerRound,
        target: TriviaItem,
        hints_available: u32,
    ) -> Result<Self, RoundError> {
        let level = DifficultyLevel::from_str(&round.difficulty)
            .map_err(|_| DifficultyError::UnknownLevel(round.difficulty.clone()))?;

        if round.guesses_max == 0 {
            return Err(RoundError::ZeroGuessAllowance);
        }
        if let Some(duplicate) = target.duplicate_hint_type() {
            return Err(RoundError::DuplicateHintType(duplicate.to_string()));
        }
        if round.trivia_item.id != target.id {
            return Err(RoundError::TargetMismatch {
                round: round.trivia_item.id.to_string(),
                target: target.id.to_string(),
            });
        }

        // A finished round on resume has already played its reveal.
        let finished = round.is_finished();
        let submission = if round.stats_processed {
            SubmissionStatus::Recorded
        } else {
            SubmissionStatus::NotSubmitted
        };

        Ok(Self {
            round,
            target,
            level,
            status: if finished {
                RoundStatus::GameOver
            } else {
                RoundStatus::Active
            },
            last_guess_result: None,
            hints_available,
            hints_used_count: 0,
            show_result_modal: false,
            flash_message: None,
            submission,
        })
    }

    pub fn round(&self) -> &PlayerRound {
        &self.round
    }

    pub fn target(&self) -> &TriviaItem {
        &self.target
    }

    pub fn level(&self) -> DifficultyLevel {
        self.level
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn last_guess_result(&self) -> Option<&LastGuessResult> {
        self.last_guess_result.as_ref()
    }

    pub fn hints_available(&self) -> u32 {
        self.hints_available
    }

    pub fn hints_used_count(&self) -> u32 {
        self.hints_used_count
    }

    pub fn show_result_modal(&self) -> bool {
        self.show_result_modal
    }

    pub fn flash_message(&self) -> Option<&str> {
        self.flash_message.as_deref()
    }

    pub fn submission(&self) -> SubmissionStatus {
        self.submission
    }

    pub fn is_interactions_disabled(&self) -> bool {
        self.status != RoundStatus::Active
    }

    /// A finished round that has not reached the server yet.
    pub fn needs_submission(&self) -> bool {
        self.round.is_finished()
            && !self.round.stats_processed
            && matches!(
                self.submission,
                SubmissionStatus::NotSubmitted | SubmissionStatus::Failed
            )
    }

    fn strategy(&self) -> HintStrategy {
        self.level.mode().hint_strategy
    }

    /// Applies one action. Actions that do not fit the current status are
    /// ignored and return the state unchanged.
    pub fn apply(self, action: RoundAction) -> (RoundState, Vec<RoundEffect>) {
        match action {
            RoundAction::MakeGuess(item) => self.make_guess(item),
            RoundAction::UseHint(hint_type) => (self.use_hint(hint_type), Vec::new()),
            RoundAction::GiveUp => self.give_up(),
            RoundAction::CompleteRevealSequence => self.complete_reveal_sequence(),
            RoundAction::ShowResultModal => {
                let mut next = self;
                next.show_result_modal = true;
                (next, Vec::new())
            }
            RoundAction::SubmissionStarted => {
                let mut next = self;
                next.submission = SubmissionStatus::InFlight;
                (next, Vec::new())
            }
            RoundAction::SubmissionSucceeded { score } => {
                let mut next = self;
                next.round.stats_processed = true;
                next.submission = SubmissionStatus::Saved { score };
                (next, Vec::new())
            }
            RoundAction::SubmissionFailed => {
                let mut next = self;
                next.submission = SubmissionStatus::Failed;
                next.flash_message = Some(SAVE_FAILED_MESSAGE.to_string());
                (next, Vec::new())
            }
            RoundAction::ClearFlashMessage => {
                let mut next = self;
                next.flash_message = None;
                (next, Vec::new())
            }
        }
    }

    fn make_guess(mut self, item: TriviaItem) -> (RoundState, Vec<RoundEffect>) {
        if self.status != RoundStatus::Active
            || self.round.guesses.len() >= self.round.guesses_max as usize
        {
            debug!(round_id = %self.round.id, "Ignoring guess on inactive round");
            return (self, Vec::new());
        }

        let correct = item.id == self.target.id;
        let (feedback, hint_info) = if correct {
            (None, None)
        } else if self.strategy() == HintStrategy::ImplicitFeedback {
            let result =
                generate_implicit_hint(Some(&item), Some(&self.target), &self.round.hints_used);
            self.round.hints_used.extend(result.revealed_hints);
            (Some(result.feedback), result.hint_info)
        } else {
            (Some(NOT_QUITE_FEEDBACK.to_string()), None)
        };

        self.round.guesses.push(Guess::new(
            item.id.clone(),
            hint_info.clone().unwrap_or_default(),
        ));
        self.round.correct_answer = correct;
        self.last_guess_result = Some(LastGuessResult {
            item_id: item.id,
            correct,
            feedback,
            hint_info,
        });

        debug!(
            round_id = %self.round.id,
            guess_number = self.round.guesses.len(),
            correct,
            "Guess recorded"
        );

        if self.round.is_finished() {
            self.finish()
        } else {
            (self, Vec::new())
        }
    }

    fn use_hint(mut self, hint_type: String) -> RoundState {
        if self.status != RoundStatus::Active
            || self.strategy() != HintStrategy::UserSpend
            || self.hints_available == 0
            || self.round.hints_used.contains(&hint_type)
        {
            return self;
        }

        self.hints_available -= 1;
        self.hints_used_count += 1;
        self.round.hints_used.insert(hint_type);
        self
    }

    fn give_up(mut self) -> (RoundState, Vec<RoundEffect>) {
        if self.status != RoundStatus::Active {
            return (self, Vec::new());
        }

        info!(round_id = %self.round.id, guesses = self.round.guesses.len(), "Player gave up");
        self.round.gave_up = true;
        self.finish()
    }

    fn complete_reveal_sequence(mut self) -> (RoundState, Vec<RoundEffect>) {
        if self.status != RoundStatus::RevealSequence || !self.round.is_finished() {
            debug!(round_id = %self.round.id, status = ?self.status, "No reveal to complete");
            return (self, Vec::new());
        }

        self.status = RoundStatus::GameOver;
        (self, vec![RoundEffect::ScheduleResultModal(RESULT_MODAL_DELAY)])
    }

    /// Ends play. The round is submitted straight away while the UI runs
    /// the reveal.
    fn finish(mut self) -> (RoundState, Vec<RoundEffect>) {
        self.status = RoundStatus::RevealSequence;
        let effects = if self.needs_submission() {
            vec![RoundEffect::SubmitRound(self.round.clone())]
        } else {
            Vec::new()
        };
        (self, effects)
    }
}
