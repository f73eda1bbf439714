pub use middleware::jwt_auth;
pub use token::TokenConfig;
pub use types::PlayerClaims;

mod middleware;
mod token;
mod types;
