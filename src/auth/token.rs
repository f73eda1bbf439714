use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::PlayerClaims;
use crate::shared::AppError;

/// Signs and verifies player bearer tokens (HS256).
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_days: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, expiration_days: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_days,
        }
    }

    /// Issues a token whose subject is the player id.
    #[instrument(skip(self))]
    pub fn create_token(&self, player_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::days(self.expiration_days)).timestamp() as usize;

        debug!(
            expiration_days = self.expiration_days,
            exp_timestamp = exp,
            "Creating player token"
        );

        let claims = PlayerClaims {
            sub: player_id.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode player token");
            AppError::Internal(e.to_string())
        })
    }

    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<PlayerClaims, AppError> {
        decode::<PlayerClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(player_id = %data.claims.sub, exp = data.claims.exp, "Player token decoded");
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode player token");
            AppError::Unauthenticated(format!("Invalid token: {}", e))
        })
    }
}
