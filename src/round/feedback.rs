use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

use crate::trivia::{Hint, HintValue, NamedEntity, TriviaItem};

pub const NOT_QUITE_FEEDBACK: &str = "Not quite! Try again.";
pub const GETTING_WARMER_FEEDBACK: &str = "You're getting warmer! Keep guessing.";
pub const ITEM_ERROR_FEEDBACK: &str = "An unexpected error occurred with item data.";

/// Only the top-billed entries of a list hint take part in matching.
const LIST_MATCH_DEPTH: usize = 5;

/// Outcome of comparing a wrong guess against the answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplicitHintResult {
    pub feedback: String,
    /// Hint types disclosed for the first time by this guess.
    pub revealed_hints: BTreeSet<String>,
    /// The answer's value for every matching hint, or `None` when nothing matched.
    pub hint_info: Option<Vec<Hint>>,
}

impl ImplicitHintResult {
    fn failure() -> Self {
        Self {
            feedback: ITEM_ERROR_FEEDBACK.to_string(),
            revealed_hints: BTreeSet::new(),
            hint_info: None,
        }
    }
}

pub fn revealed_feedback(label: &str) -> String {
    format!("You're on the right track with the {}! (Hint Revealed)", label)
}

/// Compares `guessed` against `correct` hint by hint.
///
/// Never fails: missing items produce a generic message so the guess still
/// goes through.
pub fn generate_implicit_hint(
    guessed: Option<&TriviaItem>,
    correct: Option<&TriviaItem>,
    already_revealed: &BTreeSet<String>,
) -> ImplicitHintResult {
    let (guessed, correct) = match (guessed, correct) {
        (Some(g), Some(c)) => (g, c),
        _ => {
            warn!("Implicit hint requested without both items");
            return ImplicitHintResult::failure();
        }
    };

    let mut hint_info = Vec::new();
    let mut revealed_hints = BTreeSet::new();
    let mut first_new_label: Option<&str> = None;

    for hint in &correct.hints {
        let Some(other) = guessed.hint(&hint.hint_type) else {
            continue;
        };
        if !values_match(&hint.value, &other.value) {
            continue;
        }

        hint_info.push(hint.clone());

        if !already_revealed.contains(&hint.hint_type)
            && revealed_hints.insert(hint.hint_type.clone())
            && first_new_label.is_none()
        {
            first_new_label = Some(hint.label.as_str());
        }
    }

    let feedback = match first_new_label {
        Some(label) => revealed_feedback(label),
        None if !hint_info.is_empty() => GETTING_WARMER_FEEDBACK.to_string(),
        None => NOT_QUITE_FEEDBACK.to_string(),
    };

    ImplicitHintResult {
        feedback,
        revealed_hints,
        hint_info: (!hint_info.is_empty()).then_some(hint_info),
    }
}

/// Shape-specific equality between the answer's value and the guess's value.
fn values_match(correct: &HintValue, guessed: &HintValue) -> bool {
    match (correct, guessed) {
        (HintValue::EntityList(correct), HintValue::EntityList(guessed)) => {
            lists_overlap(correct, guessed)
        }
        (HintValue::Entity(correct), HintValue::Entity(guessed)) => {
            !correct.id.is_blank() && !guessed.id.is_blank() && correct.id == guessed.id
        }
        (HintValue::Scalar(correct), HintValue::Scalar(guessed)) => {
            !correct.trim().is_empty() && correct == guessed
        }
        _ => false,
    }
}

fn lists_overlap(correct: &[NamedEntity], guessed: &[NamedEntity]) -> bool {
    let guessed_ids: HashSet<_> = guessed
        .iter()
        .take(LIST_MATCH_DEPTH)
        .filter(|e| !e.id.is_blank())
        .map(|e| &e.id)
        .collect();

    correct
        .iter()
        .take(LIST_MATCH_DEPTH)
        .any(|e| guessed_ids.contains(&e.id))
}
