use serde::{Deserialize, Serialize};

/// JWT claims identifying the calling player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerClaims {
    /// Player id.
    pub sub: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

impl PlayerClaims {
    pub fn player_id(&self) -> &str {
        &self.sub
    }
}
