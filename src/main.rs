use dailytrivia::{
    build_router,
    stats::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository, StatsService},
    AppConfig, AppState,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dailytrivia=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting daily trivia server");

    let config = AppConfig::from_env();

    let repository: Arc<dyn StatsRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url)
                .await
                .expect("Failed to connect to database");
            let repository = PostgresStatsRepository::new(pool);
            repository
                .init_schema()
                .await
                .expect("Failed to initialize stats schema");
            info!("Using PostgreSQL stats repository");
            Arc::new(repository)
        }
        None => {
            warn!("DATABASE_URL not set, stats are kept in memory");
            Arc::new(InMemoryStatsRepository::new())
        }
    };

    let policy = config.retry_policy();
    info!(
        max_attempts = policy.max_attempts,
        base_delay_ms = policy.base_delay.as_millis() as u64,
        dedupe = config.dedupe_processed_rounds,
        "Stats transactions configured"
    );

    let stats_service = Arc::new(StatsService::new(
        repository,
        policy,
        config.submission_options(),
    ));
    let app = build_router(AppState::new(stats_service, config.token_config()));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind listener");
    info!("Server running on http://{}", address);
    axum::serve(listener, app).await.expect("Server error");
}
