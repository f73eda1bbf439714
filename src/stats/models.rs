use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::MAX_GUESSES;
use crate::round::PlayerRound;
use crate::trivia::{GameMode, Identifier};

pub const DEFAULT_HINTS_AVAILABLE: u32 = 3;

/// Lifetime statistics for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    pub id: String,
    pub current_streak: u32,
    pub max_streak: u32,
    pub games: u32,
    /// `wins[n]` counts wins on guess `n + 1`.
    pub wins: Vec<u32>,
    pub all_time_score: u64,
    pub hints_available: u32,
    pub hints_used_count: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            id: String::new(),
            current_streak: 0,
            max_streak: 0,
            games: 0,
            wins: vec![0; MAX_GUESSES],
            all_time_score: 0,
            hints_available: DEFAULT_HINTS_AVAILABLE,
            hints_used_count: 0,
        }
    }
}

impl PlayerStats {
    pub fn new(player_id: &str) -> Self {
        Self {
            id: player_id.to_string(),
            ..Self::default()
        }
    }

    /// Folds one finished round into the totals.
    pub fn record_round(&mut self, won: bool, guess_count: usize, score: u32) {
        if self.wins.len() < MAX_GUESSES {
            self.wins.resize(MAX_GUESSES, 0);
        }

        self.games += 1;
        self.all_time_score += u64::from(score);

        if won {
            self.current_streak += 1;
            self.max_streak = self.max_streak.max(self.current_streak);
            if (1..=MAX_GUESSES).contains(&guess_count) {
                self.wins[guess_count - 1] += 1;
            }
        } else {
            self.current_streak = 0;
        }
    }

    /// Charges hints bought during a round against the player's allowance.
    pub fn spend_hints(&mut self, spent: u32) {
        self.hints_used_count = self.hints_used_count.saturating_add(spent);
        self.hints_available = self.hints_available.saturating_sub(spent);
    }

    pub fn total_wins(&self) -> u32 {
        self.wins.iter().sum()
    }
}

/// One line of a player's game history, keyed by date id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameHistoryEntry {
    pub date_id: String,
    pub item_id: Identifier,
    pub item_title: String,
    pub poster_path: String,
    pub was_correct: bool,
    pub gave_up: bool,
    pub guess_count: u32,
    pub guesses_max: u32,
    pub difficulty: String,
    pub score: u32,
    pub game_mode: GameMode,
    pub created_at: DateTime<Utc>,
}

impl GameHistoryEntry {
    pub fn from_round(
        round: &PlayerRound,
        date_id: &str,
        score: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            date_id: date_id.to_string(),
            item_id: round.trivia_item.id.clone(),
            item_title: round.trivia_item.title.clone(),
            poster_path: round.trivia_item.poster_path.clone(),
            was_correct: round.correct_answer,
            gave_up: round.gave_up,
            guess_count: round.guesses.len() as u32,
            guesses_max: round.guesses_max,
            difficulty: round.difficulty.clone(),
            score,
            game_mode: round.game_mode,
            created_at,
        }
    }
}

/// A round as stored after processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    #[serde(flatten)]
    pub round: PlayerRound,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRoundRequest {
    pub player_game: PlayerRound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRoundResponse {
    pub success: bool,
    pub score: u32,
}
