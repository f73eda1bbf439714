pub mod models;

pub use models::{
    GameMode, Hint, HintValue, Identifier, ItemSummary, NamedEntity, TriviaItem,
};
