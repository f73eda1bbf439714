use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

/// Longest round any difficulty allows. Sizes the win histogram.
pub const MAX_GUESSES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DifficultyError {
    #[error("Unknown difficulty level: {0}")]
    UnknownLevel(String),
}

/// Known difficulty levels. Unknown tags are rejected at parse time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum DifficultyLevel {
    #[serde(rename = "LEVEL_1")]
    #[strum(serialize = "LEVEL_1")]
    Level1,
    #[serde(rename = "LEVEL_2")]
    #[strum(serialize = "LEVEL_2")]
    Level2,
    #[serde(rename = "LEVEL_3")]
    #[strum(serialize = "LEVEL_3")]
    Level3,
    #[serde(rename = "LEVEL_4")]
    #[strum(serialize = "LEVEL_4")]
    Level4,
    #[serde(rename = "LEVEL_5")]
    #[strum(serialize = "LEVEL_5")]
    Level5,
}

/// How clues are handed out during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HintStrategy {
    /// Everything is visible from the start.
    AllRevealed,
    /// The player spends hint points to open specific hints.
    UserSpend,
    /// Wrong guesses that share an attribute reveal it.
    ImplicitFeedback,
    NoneDisabled,
    ExtremeChallenge,
}

/// Scoring and pacing parameters for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyMode {
    pub level: DifficultyLevel,
    pub label: &'static str,
    pub description: &'static str,
    pub guesses_max: u32,
    pub hint_strategy: HintStrategy,
    pub score_multiplier: f64,
    pub score_range_percentage: f64,
}

const LEVEL_1: DifficultyMode = DifficultyMode {
    level: DifficultyLevel::Level1,
    label: "Basic",
    description: "All facts and hints are revealed at the start of the game.",
    guesses_max: 5,
    hint_strategy: HintStrategy::AllRevealed,
    score_multiplier: 0.4,
    score_range_percentage: 0.75,
};

const LEVEL_2: DifficultyMode = DifficultyMode {
    level: DifficultyLevel::Level2,
    label: "Easy",
    description: "Clues are revealed gradually. Spend hint points to open specific hints.",
    guesses_max: 5,
    hint_strategy: HintStrategy::UserSpend,
    score_multiplier: 0.55,
    score_range_percentage: 0.65,
};

const LEVEL_3: DifficultyMode = DifficultyMode {
    level: DifficultyLevel::Level3,
    label: "Medium",
    description: "Hints are revealed when a guess shares a category with the answer.",
    guesses_max: 5,
    hint_strategy: HintStrategy::ImplicitFeedback,
    score_multiplier: 0.7,
    score_range_percentage: 0.6,
};

const LEVEL_4: DifficultyMode = DifficultyMode {
    level: DifficultyLevel::Level4,
    label: "Hard",
    description: "A pure test of knowledge. No hints are available.",
    guesses_max: 5,
    hint_strategy: HintStrategy::NoneDisabled,
    score_multiplier: 0.85,
    score_range_percentage: 0.5,
};

const LEVEL_5: DifficultyMode = DifficultyMode {
    level: DifficultyLevel::Level5,
    label: "Extreme",
    description: "Only 3 guesses, slower clues and no hints.",
    guesses_max: 3,
    hint_strategy: HintStrategy::ExtremeChallenge,
    score_multiplier: 1.0,
    score_range_percentage: 0.4,
};

impl DifficultyLevel {
    pub const DEFAULT: DifficultyLevel = DifficultyLevel::Level3;

    pub fn mode(self) -> &'static DifficultyMode {
        match self {
            DifficultyLevel::Level1 => &LEVEL_1,
            DifficultyLevel::Level2 => &LEVEL_2,
            DifficultyLevel::Level3 => &LEVEL_3,
            DifficultyLevel::Level4 => &LEVEL_4,
            DifficultyLevel::Level5 => &LEVEL_5,
        }
    }

    /// Only levels where hints are bought are charged for them.
    pub fn penalizes_spent_hints(self) -> bool {
        self.mode().hint_strategy == HintStrategy::UserSpend
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Resolves a raw level tag such as `"LEVEL_3"`.
pub fn lookup(level_id: &str) -> Result<&'static DifficultyMode, DifficultyError> {
    DifficultyLevel::from_str(level_id)
        .map(DifficultyLevel::mode)
        .map_err(|_| DifficultyError::UnknownLevel(level_id.to_string()))
}

pub fn all_modes() -> impl Iterator<Item = &'static DifficultyMode> {
    DifficultyLevel::iter().map(DifficultyLevel::mode)
}
