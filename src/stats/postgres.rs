use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};
use tracing::{debug, instrument, warn};

use super::{
    repository::{PlayerSnapshot, PlayerWrite, StatsRepository},
    GameHistoryEntry, PlayerStats, RoundRecord, StatsError,
};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS player_stats (
        player_id TEXT PRIMARY KEY,
        version BIGINT NOT NULL,
        stats JSONB NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS player_rounds (
        player_id TEXT NOT NULL,
        round_id TEXT NOT NULL,
        record JSONB NOT NULL,
        PRIMARY KEY (player_id, round_id)
    )",
    "CREATE TABLE IF NOT EXISTS game_history (
        player_id TEXT NOT NULL,
        date_id TEXT NOT NULL,
        entry JSONB NOT NULL,
        PRIMARY KEY (player_id, date_id)
    )",
];

fn db_error(e: sqlx::Error) -> StatsError {
    warn!(error = %e, "Stats database operation failed");
    StatsError::Repository(e.to_string())
}

/// PostgreSQL implementation of the stats repository. Player stats carry a
/// version column that every commit bumps under a compare-and-set.
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the stats tables if they do not exist.
    pub async fn init_schema(&self) -> Result<(), StatsError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
        }
        debug!("Stats schema ready");
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self))]
    async fn read_snapshot(
        &self,
        player_id: &str,
        round_id: &str,
    ) -> Result<PlayerSnapshot, StatsError> {
        let stats_row = sqlx::query("SELECT version, stats FROM player_stats WHERE player_id = $1")
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        let (version, stats) = match stats_row {
            Some(row) => {
                let version: i64 = row.try_get("version").map_err(db_error)?;
                let Json(stats): Json<PlayerStats> = row.try_get("stats").map_err(db_error)?;
                (version as u64, Some(stats))
            }
            None => (0, None),
        };

        Ok(PlayerSnapshot {
            version,
            stats,
            round: self.get_round(player_id, round_id).await?,
        })
    }

    #[instrument(skip(self, write))]
    async fn commit(
        &self,
        player_id: &str,
        expected_version: u64,
        write: PlayerWrite,
    ) -> Result<u64, StatsError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let next_version = expected_version as i64 + 1;

        let result = if expected_version == 0 {
            sqlx::query(
                "INSERT INTO player_stats (player_id, version, stats) VALUES ($1, 1, $2) \
                 ON CONFLICT (player_id) DO NOTHING",
            )
            .bind(player_id)
            .bind(Json(&write.stats))
            .execute(&mut *tx)
            .await
        } else {
            sqlx::query(
                "UPDATE player_stats SET version = $3, stats = $2, updated_at = now() \
                 WHERE player_id = $1 AND version = $4",
            )
            .bind(player_id)
            .bind(Json(&write.stats))
            .bind(next_version)
            .bind(expected_version as i64)
            .execute(&mut *tx)
            .await
        }
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            warn!(player_id, expected_version, "Stats write conflict in database");
            return Err(StatsError::WriteConflict(player_id.to_string()));
        }

        sqlx::query(
            "INSERT INTO player_rounds (player_id, round_id, record) VALUES ($1, $2, $3) \
             ON CONFLICT (player_id, round_id) DO UPDATE SET record = EXCLUDED.record",
        )
        .bind(player_id)
        .bind(&write.round.round.id)
        .bind(Json(&write.round))
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query(
            "INSERT INTO game_history (player_id, date_id, entry) VALUES ($1, $2, $3) \
             ON CONFLICT (player_id, date_id) DO UPDATE SET entry = EXCLUDED.entry",
        )
        .bind(player_id)
        .bind(&write.history.date_id)
        .bind(Json(&write.history))
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        debug!(player_id, version = next_version, "Stats committed in database");
        Ok(next_version as u64)
    }

    #[instrument(skip(self))]
    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError> {
        let row = sqlx::query("SELECT stats FROM player_stats WHERE player_id = $1")
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(|row| {
            row.try_get::<Json<PlayerStats>, _>("stats")
                .map(|json| json.0)
                .map_err(db_error)
        })
        .transpose()
    }

    #[instrument(skip(self))]
    async fn get_round(
        &self,
        player_id: &str,
        round_id: &str,
    ) -> Result<Option<RoundRecord>, StatsError> {
        let row = sqlx::query(
            "SELECT record FROM player_rounds WHERE player_id = $1 AND round_id = $2",
        )
        .bind(player_id)
        .bind(round_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(|row| {
            row.try_get::<Json<RoundRecord>, _>("record")
                .map(|json| json.0)
                .map_err(db_error)
        })
        .transpose()
    }

    #[instrument(skip(self))]
    async fn list_history(&self, player_id: &str) -> Result<Vec<GameHistoryEntry>, StatsError> {
        let rows = sqlx::query(
            "SELECT entry FROM game_history WHERE player_id = $1 ORDER BY date_id DESC",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                row.try_get::<Json<GameHistoryEntry>, _>("entry")
                    .map(|json| json.0)
                    .map_err(db_error)
            })
            .collect()
    }
}
