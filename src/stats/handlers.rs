use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::{info, instrument, warn};

use super::{GameHistoryEntry, PlayerStats, SubmitRoundRequest, SubmitRoundResponse};
use crate::{
    auth::PlayerClaims,
    shared::{AppError, AppState},
};

/// Score a finished round and fold it into the caller's stats
/// POST /games/submit
#[instrument(skip(state, claims, body), fields(player_id = %claims.sub))]
pub async fn submit_game_result(
    State(state): State<AppState>,
    Extension(claims): Extension<PlayerClaims>,
    body: Result<Json<SubmitRoundRequest>, JsonRejection>,
) -> Result<Json<SubmitRoundResponse>, AppError> {
    let Json(request) = body.map_err(|rejection| {
        warn!(error = %rejection, "Malformed round submission");
        AppError::BadRequest(format!("Invalid game data: {}", rejection.body_text()))
    })?;

    let response = state
        .stats_service
        .submit_round(request.player_game, Some(claims.player_id()))
        .await?;

    info!(score = response.score, "Round submission accepted");
    Ok(Json(response))
}

/// GET /players/me/stats
#[instrument(skip(state, claims), fields(player_id = %claims.sub))]
pub async fn get_my_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<PlayerClaims>,
) -> Result<Json<PlayerStats>, AppError> {
    let stats = state
        .stats_service
        .get_player_stats(claims.player_id())
        .await?;
    Ok(Json(stats))
}

/// Newest first
/// GET /players/me/history
#[instrument(skip(state, claims), fields(player_id = %claims.sub))]
pub async fn get_my_history(
    State(state): State<AppState>,
    Extension(claims): Extension<PlayerClaims>,
) -> Result<Json<Vec<GameHistoryEntry>>, AppError> {
    let history = state.stats_service.list_history(claims.player_id()).await?;
    Ok(Json(history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::stats::{InMemoryStatsRepository, StatsRepository};
    use std::sync::Arc;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for `oneshot`

    fn claims(player_id: &str) -> PlayerClaims {
        PlayerClaims {
            sub: player_id.to_string(),
            exp: usize::MAX,
            iat: 0,
        }
    }

    /// Routes with claims injected directly, bypassing token checks.
    fn app_as(player_id: &str, state: AppState) -> Router {
        Router::new()
            .route("/games/submit", post(submit_game_result))
            .route("/players/me/stats", get(get_my_stats))
            .route("/players/me/history", get(get_my_history))
            .layer(Extension(claims(player_id)))
            .with_state(state)
    }

    fn submission(player_id: &str) -> Value {
        json!({
            "playerGame": {
                "id": "game-1",
                "playerID": player_id,
                "correctAnswer": true,
                "difficulty": "LEVEL_4",
                "guesses": [{}],
                "guessesMax": 5,
                "startDate": "2023-01-01",
                "triviaItem": {"id": 101, "title": "Test Movie", "posterPath": "/path.jpg"}
            }
        })
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn submit_returns_score() {
        let app = app_as("user-123", AppStateBuilder::new().build());

        let response = app
            .oneshot(post_json("/games/submit", &submission("user-123")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"success": true, "score": 850}));
    }

    #[tokio::test]
    async fn submit_for_another_player_is_forbidden() {
        let app = app_as("user-123", AppStateBuilder::new().build());

        let response = app
            .oneshot(post_json("/games/submit", &submission("someone-else")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["code"], "permission-denied");
        assert_eq!(body["error"], "Invalid game data ownership.");
    }

    #[tokio::test]
    async fn missing_player_game_is_bad_request() {
        let app = app_as("user-123", AppStateBuilder::new().build());

        let response = app
            .oneshot(post_json("/games/submit", &json!({"somethingElse": true})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "invalid-argument");
    }

    #[tokio::test]
    async fn stats_and_history_reflect_submission() {
        let state = AppStateBuilder::new().build();
        app_as("user-123", state.clone())
            .oneshot(post_json("/games/submit", &submission("user-123")))
            .await
            .unwrap();

        let stats = app_as("user-123", state.clone())
            .oneshot(
                Request::builder()
                    .uri("/players/me/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(stats.status(), StatusCode::OK);
        let stats = json_body(stats).await;
        assert_eq!(stats["games"], 1);
        assert_eq!(stats["wins"], json!([1, 0, 0, 0, 0]));
        assert_eq!(stats["allTimeScore"], 850);

        let history = app_as("user-123", state)
            .oneshot(
                Request::builder()
                    .uri("/players/me/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let history = json_body(history).await;
        assert_eq!(history[0]["dateId"], "2023-01-01");
        assert_eq!(history[0]["score"], 850);
    }

    #[tokio::test]
    async fn dedupe_state_answers_resubmission_with_stored_score() {
        let state = AppStateBuilder::new().with_dedupe().build();

        for _ in 0..2 {
            let response = app_as("user-123", state.clone())
                .oneshot(post_json("/games/submit", &submission("user-123")))
                .await
                .unwrap();
            assert_eq!(json_body(response).await, json!({"success": true, "score": 850}));
        }

        let stats = state.stats_service.get_player_stats("user-123").await.unwrap();
        assert_eq!(stats.games, 1);
        assert_eq!(stats.all_time_score, 850);
    }

    #[tokio::test]
    async fn submission_is_written_to_the_configured_repository() {
        let repository = Arc::new(InMemoryStatsRepository::new());
        let state = AppStateBuilder::new()
            .with_repository(repository.clone())
            .build();

        let response = app_as("user-123", state)
            .oneshot(post_json("/games/submit", &submission("user-123")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stored = repository.get_round("user-123", "game-1").await.unwrap().unwrap();
        assert_eq!(stored.score, 850);
        assert!(stored.round.stats_processed);
    }
}
