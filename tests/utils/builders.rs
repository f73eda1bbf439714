use serde_json::{json, Value};
use std::collections::BTreeMap;

use dailytrivia::trivia::{Hint, HintValue, Identifier, NamedEntity, TriviaItem};

// ============================================================================
// Trivia Item Builders
// ============================================================================

pub struct ItemBuilder {
    id: i64,
    title: String,
    hints: Vec<Hint>,
}

impl ItemBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            title: format!("Item {}", id),
            hints: vec![],
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_director(mut self, id: i64, name: &str) -> Self {
        self.hints.push(Hint::new(
            "director",
            "Director",
            HintValue::Entity(NamedEntity::new(id, name)),
        ));
        self
    }

    pub fn with_genres(mut self, genres: &[(i64, &str)]) -> Self {
        self.hints.push(Hint::new(
            "genre",
            "Genre",
            HintValue::EntityList(
                genres
                    .iter()
                    .map(|(id, name)| NamedEntity::new(*id, *name))
                    .collect(),
            ),
        ));
        self
    }

    pub fn with_year(mut self, year: &str) -> Self {
        self.hints
            .push(Hint::new("year", "Year", HintValue::scalar(year)));
        self
    }

    pub fn build(self) -> TriviaItem {
        TriviaItem {
            id: Identifier::Number(self.id),
            title: self.title,
            description: String::new(),
            poster_path: format!("/posters/{}.jpg", self.id),
            release_date: String::new(),
            metadata: BTreeMap::new(),
            hints: self.hints,
        }
    }
}

// ============================================================================
// Submission Payload Builders
// ============================================================================

/// Builds the JSON body a client sends to `POST /games/submit`.
pub struct RoundPayloadBuilder {
    round: Value,
}

impl RoundPayloadBuilder {
    pub fn new(round_id: &str, player_id: &str) -> Self {
        Self {
            round: json!({
                "id": round_id,
                "playerID": player_id,
                "correctAnswer": false,
                "difficulty": "LEVEL_3",
                "guesses": [],
                "guessesMax": 5,
                "startDate": "2023-01-01",
                "triviaItem": {"id": 101, "title": "Test Movie", "posterPath": "/path.jpg"}
            }),
        }
    }

    pub fn won_in(mut self, guesses: usize) -> Self {
        self.round["correctAnswer"] = json!(true);
        self.round["guesses"] = json!(vec![json!({}); guesses]);
        self
    }

    /// Uses up every guess the round allows.
    pub fn lost(mut self) -> Self {
        let allowance = self.round["guessesMax"].as_u64().unwrap_or(5) as usize;
        self.round["correctAnswer"] = json!(false);
        self.round["guesses"] = json!(vec![json!({}); allowance]);
        self
    }

    /// Known levels also get their guess allowance.
    pub fn difficulty(mut self, level: &str) -> Self {
        self.round["difficulty"] = json!(level);
        if let Ok(mode) = dailytrivia::difficulty::lookup(level) {
            self.round["guessesMax"] = json!(mode.guesses_max);
        }
        self
    }

    pub fn hints_used(mut self, hints_used: Value) -> Self {
        self.round["hintsUsed"] = hints_used;
        self
    }

    pub fn guesses_max(mut self, guesses_max: u32) -> Self {
        self.round["guessesMax"] = json!(guesses_max);
        self
    }

    pub fn start_date(mut self, start_date: Value) -> Self {
        self.round["startDate"] = start_date;
        self
    }

    pub fn round(self) -> Value {
        self.round
    }

    pub fn request(self) -> Value {
        json!({ "playerGame": self.round })
    }
}
