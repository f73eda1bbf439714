use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use strum_macros::{Display, EnumString};

/// Identifier that may arrive as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl Identifier {
    /// Zero and blank strings are the "no value" placeholders of the data set.
    pub fn is_blank(&self) -> bool {
        match self {
            Identifier::Number(n) => *n == 0,
            Identifier::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{}", n),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Identifier::Number(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::Text(value.to_string())
    }
}

/// A person, studio or genre referenced by a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: Identifier,
    pub name: String,
}

impl NamedEntity {
    pub fn new(id: impl Into<Identifier>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The payload of a hint. Variant order matters for untagged decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HintValue {
    Scalar(String),
    Entity(NamedEntity),
    EntityList(Vec<NamedEntity>),
}

impl HintValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        HintValue::Scalar(value.into())
    }

    /// Text suitable for a guess-row tile.
    pub fn display_text(&self) -> String {
        match self {
            HintValue::Scalar(s) => s.clone(),
            HintValue::Entity(e) => e.name.clone(),
            HintValue::EntityList(list) => list
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    #[serde(rename = "type")]
    pub hint_type: String,
    #[serde(default)]
    pub label: String,
    pub value: HintValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_linkable: Option<bool>,
}

impl Hint {
    pub fn new(hint_type: impl Into<String>, label: impl Into<String>, value: HintValue) -> Self {
        Self {
            hint_type: hint_type.into(),
            label: label.into(),
            value,
            is_linkable: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum GameMode {
    #[default]
    Movies,
    VideoGames,
    TvShows,
}

/// A movie, show or game that can be the daily answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriviaItem {
    pub id: Identifier,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default)]
    pub hints: Vec<Hint>,
}

impl TriviaItem {
    pub fn hint(&self, hint_type: &str) -> Option<&Hint> {
        self.hints.iter().find(|h| h.hint_type == hint_type)
    }

    /// Returns the first hint type that appears more than once.
    pub fn duplicate_hint_type(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.hints
            .iter()
            .map(|h| h.hint_type.as_str())
            .find(|t| !seen.insert(*t))
    }

    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
        }
    }
}

/// The slice of a trivia item that travels with a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: Identifier,
    pub title: String,
    #[serde(default)]
    pub poster_path: String,
}
