use tracing::warn;

use super::models::PlayerRound;
use crate::difficulty::{self, DifficultyLevel};

/// Score for a first-guess win at multiplier 1.0.
pub const MAX_SCORE: f64 = 1000.0;
/// Points taken off per hint bought on a spend-for-hints level.
pub const HINT_PENALTY: i64 = 50;

/// Points earned by a finished round.
///
/// Pure and deterministic. Losses and unknown levels score 0.
pub fn calculate_score(round: &PlayerRound) -> u32 {
    if !round.correct_answer {
        return 0;
    }

    let mode = match difficulty::lookup(&round.difficulty) {
        Ok(mode) => mode,
        Err(err) => {
            warn!(round_id = %round.id, %err, "Scoring round with unknown difficulty as zero");
            return 0;
        }
    };

    let max_score = MAX_SCORE * mode.score_multiplier;
    let performance_pool = max_score * mode.score_range_percentage;
    let base_points = max_score - performance_pool;

    let earned = performance_pool
        * performance_factor(round.guesses_max, round.guesses.len());

    let penalty = hint_penalty(mode.level, round.hints_used.len());
    let raw = (base_points + earned).round() as i64 - penalty;

    raw.max(0) as u32
}

/// 1.0 for a first-guess win, 0.0 for a win on the last allowed guess.
/// Clamped so malformed guess counts cannot push past the bounds.
fn performance_factor(guesses_max: u32, guesses_used: usize) -> f64 {
    if guesses_max <= 1 {
        return 1.0;
    }
    let max = guesses_max as f64;
    let used = guesses_used as f64;
    ((max - used) / (max - 1.0)).clamp(0.0, 1.0)
}

fn hint_penalty(level: DifficultyLevel, hints_spent: usize) -> i64 {
    if level.penalizes_spent_hints() {
        hints_spent as i64 * HINT_PENALTY
    } else {
        0
    }
}
