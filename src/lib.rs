// Library crate for the daily trivia server
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod config;
pub mod difficulty;
pub mod round;
pub mod shared;
pub mod stats;
pub mod trivia;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::AppConfig;
pub use difficulty::{DifficultyLevel, DifficultyMode, HintStrategy};
pub use round::{RoundSession, RoundState};
pub use shared::{AppError, AppState};
pub use stats::{StatsError, StatsService};

/// Builds the HTTP application. Everything except `/health` requires a
/// player bearer token.
pub fn build_router(state: AppState) -> Router {
    let player_routes = Router::new()
        .route("/games/submit", post(stats::handlers::submit_game_result))
        .route("/players/me/stats", get(stats::handlers::get_my_stats))
        .route("/players/me/history", get(stats::handlers::get_my_history))
        .layer(middleware::from_fn_with_state(state.clone(), auth::jwt_auth));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(player_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
