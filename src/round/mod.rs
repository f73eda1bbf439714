pub mod feedback;
pub mod models;
pub mod scoring;
pub mod session;
pub mod state;

pub use feedback::{generate_implicit_hint, ImplicitHintResult};
pub use models::{generate_date_id, resolve_date_id, Guess, PlayerRound, StartDate};
pub use scoring::calculate_score;
pub use session::{RoundSession, RoundSubmitter, SubmitError};
pub use state::{
    LastGuessResult, RoundAction, RoundEffect, RoundError, RoundState, RoundStatus,
    SubmissionStatus,
};
