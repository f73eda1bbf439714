use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("The function must be called while authenticated.")]
    Unauthenticated,

    #[error("Invalid game data ownership.")]
    PermissionDenied,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Write conflict on stats for player {0}")]
    WriteConflict(String),

    #[error("Stats transaction gave up after {attempts} attempts")]
    ContentionExhausted { attempts: u32 },

    #[error("Repository error: {0}")]
    Repository(String),
}

impl StatsError {
    /// Failure code reported to the submitting client.
    pub fn code(&self) -> &'static str {
        match self {
            StatsError::Unauthenticated => "unauthenticated",
            StatsError::PermissionDenied => "permission-denied",
            StatsError::Validation(_) => "invalid-argument",
            StatsError::WriteConflict(_)
            | StatsError::ContentionExhausted { .. }
            | StatsError::Repository(_) => "internal",
        }
    }

    /// Input and ownership failures will fail again on retry.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            StatsError::Unauthenticated | StatsError::PermissionDenied | StatsError::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_wire_contract() {
        assert_eq!(StatsError::Unauthenticated.code(), "unauthenticated");
        assert_eq!(StatsError::PermissionDenied.code(), "permission-denied");
        assert_eq!(StatsError::ContentionExhausted { attempts: 5 }.code(), "internal");
        assert_eq!(StatsError::Repository("boom".into()).code(), "internal");
    }

    #[test]
    fn only_input_errors_are_permanent() {
        assert!(StatsError::PermissionDenied.is_permanent());
        assert!(!StatsError::WriteConflict("p".into()).is_permanent());
    }
}
