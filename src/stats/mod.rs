pub mod handlers;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod transaction;

mod errors;
pub mod models;

pub use errors::StatsError;
pub use models::*;
pub use postgres::PostgresStatsRepository;
pub use repository::{InMemoryStatsRepository, PlayerSnapshot, PlayerWrite, StatsRepository};
pub use service::{InProcessSubmitter, StatsService, SubmissionOptions};
pub use transaction::{AtomicUpdater, RetryPolicy, Update};
