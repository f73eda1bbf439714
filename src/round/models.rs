use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::difficulty::DifficultyLevel;
use crate::trivia::{GameMode, Hint, Identifier, ItemSummary};

/// One submitted candidate and the hints it surfaced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guess {
    #[serde(default)]
    pub item_id: Option<Identifier>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hint_info: Vec<Hint>,
}

impl Guess {
    pub fn new(item_id: Identifier, hint_info: Vec<Hint>) -> Self {
        Self {
            item_id: Some(item_id),
            hint_info,
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Clients send spent hints either as a list of hint types or as a
/// `{hintType: bool}` map.
#[derive(Deserialize)]
#[serde(untagged)]
enum HintsUsedWire {
    Flags(BTreeMap<String, bool>),
    Types(Vec<String>),
}

fn hints_used_from_wire<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<HintsUsedWire>::deserialize(deserializer)? {
        Some(HintsUsedWire::Flags(flags)) => flags
            .into_iter()
            .filter_map(|(hint_type, used)| used.then_some(hint_type))
            .collect(),
        Some(HintsUsedWire::Types(types)) => types.into_iter().collect(),
        None => BTreeSet::new(),
    })
}

/// When a round started. Clients send a date string, epoch millis or a
/// `{seconds, nanoseconds}` timestamp object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartDate {
    Timestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Millis(i64),
    Text(String),
}

impl StartDate {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        StartDate::Text(at.to_rfc3339())
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            StartDate::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds),
            StartDate::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            StartDate::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|naive| naive.and_utc())
                }),
        }
    }
}

/// Formats the `YYYY-MM-DD` key used for history entries.
pub fn generate_date_id(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Date id for a round, falling back to `now` when the start date is
/// missing or unreadable.
pub fn resolve_date_id(start_date: Option<&StartDate>, now: DateTime<Utc>) -> String {
    match start_date.map(|s| (s, s.to_datetime())) {
        Some((_, Some(at))) => generate_date_id(at),
        Some((raw, None)) => {
            warn!(?raw, "Unreadable round start date, using current date");
            generate_date_id(now)
        }
        None => {
            warn!("Round has no start date, using current date");
            generate_date_id(now)
        }
    }
}

/// A player's attempt at one daily item.
///
/// `difficulty` is kept as the raw tag so forged levels can be detected
/// when the round comes back to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRound {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "playerID", alias = "playerId", default)]
    pub player_id: String,
    #[serde(default)]
    pub correct_answer: bool,
    #[serde(default)]
    pub gave_up: bool,
    #[serde(default)]
    pub guesses: Vec<Guess>,
    pub guesses_max: u32,
    #[serde(default, deserialize_with = "hints_used_from_wire")]
    pub hints_used: BTreeSet<String>,
    pub difficulty: String,
    #[serde(default)]
    pub start_date: Option<StartDate>,
    pub trivia_item: ItemSummary,
    #[serde(default)]
    pub game_mode: GameMode,
    #[serde(default)]
    pub stats_processed: bool,
}

impl PlayerRound {
    pub fn new(
        id: String,
        player_id: String,
        level: DifficultyLevel,
        trivia_item: ItemSummary,
        game_mode: GameMode,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            player_id,
            correct_answer: false,
            gave_up: false,
            guesses: Vec::new(),
            guesses_max: level.mode().guesses_max,
            hints_used: BTreeSet::new(),
            difficulty: level.to_string(),
            start_date: Some(StartDate::from_datetime(started_at)),
            trivia_item,
            game_mode,
            stats_processed: false,
        }
    }

    pub fn guess_count(&self) -> usize {
        self.guesses.len()
    }

    pub fn is_finished(&self) -> bool {
        self.correct_answer || self.gave_up || self.guesses.len() >= self.guesses_max as usize
    }
}
