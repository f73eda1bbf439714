use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use dailytrivia::{
    auth::TokenConfig,
    build_router,
    stats::{
        InMemoryStatsRepository, InProcessSubmitter, RetryPolicy, StatsService,
        SubmissionOptions,
    },
    AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestSetup {
    pub repository: Arc<InMemoryStatsRepository>,
    pub stats_service: Arc<StatsService>,
    pub token_config: TokenConfig,
    pub router: Router,
}

impl TestSetup {
    pub fn token_for(&self, player_id: &str) -> String {
        self.token_config
            .create_token(player_id)
            .expect("token should be issued")
    }

    pub fn submitter_for(&self, player_id: &str) -> Arc<InProcessSubmitter> {
        Arc::new(InProcessSubmitter::new(
            self.stats_service.clone(),
            Some(player_id.to_string()),
        ))
    }
}

pub struct TestSetupBuilder {
    options: SubmissionOptions,
    max_attempts: u32,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            options: SubmissionOptions::default(),
            max_attempts: 5,
        }
    }

    pub fn with_dedupe(mut self) -> Self {
        self.options.dedupe_processed_rounds = true;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn build(self) -> TestSetup {
        let repository = Arc::new(InMemoryStatsRepository::new());
        let stats_service = Arc::new(StatsService::new(
            repository.clone(),
            RetryPolicy::new(self.max_attempts, Duration::from_millis(1)),
            self.options,
        ));
        let token_config = TokenConfig::new(TEST_SECRET, 1);
        let router = build_router(AppState::new(stats_service.clone(), token_config.clone()));

        TestSetup {
            repository,
            stats_service,
            token_config,
            router,
        }
    }
}
