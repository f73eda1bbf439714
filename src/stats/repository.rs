use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{GameHistoryEntry, PlayerStats, RoundRecord, StatsError};

/// What a stats transaction sees when it starts.
#[derive(Debug, Clone, Default)]
pub struct PlayerSnapshot {
    /// 0 when the player has no stats document yet.
    pub version: u64,
    pub stats: Option<PlayerStats>,
    pub round: Option<RoundRecord>,
}

/// Everything one processed round writes.
#[derive(Debug, Clone)]
pub struct PlayerWrite {
    pub stats: PlayerStats,
    pub round: RoundRecord,
    pub history: GameHistoryEntry,
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn read_snapshot(
        &self,
        player_id: &str,
        round_id: &str,
    ) -> Result<PlayerSnapshot, StatsError>;

    /// Applies `write` only if the player's version is still
    /// `expected_version`, otherwise fails with [`StatsError::WriteConflict`].
    /// Returns the new version.
    async fn commit(
        &self,
        player_id: &str,
        expected_version: u64,
        write: PlayerWrite,
    ) -> Result<u64, StatsError>;

    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError>;

    async fn get_round(
        &self,
        player_id: &str,
        round_id: &str,
    ) -> Result<Option<RoundRecord>, StatsError>;

    /// Newest first.
    async fn list_history(&self, player_id: &str) -> Result<Vec<GameHistoryEntry>, StatsError>;
}

#[derive(Debug, Default)]
struct PlayerDocument {
    version: u64,
    stats: Option<PlayerStats>,
    rounds: HashMap<String, RoundRecord>,
    history: BTreeMap<String, GameHistoryEntry>,
}

/// In-memory implementation of StatsRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    players: Arc<RwLock<HashMap<String, PlayerDocument>>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            players: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    #[instrument(skip(self))]
    async fn read_snapshot(
        &self,
        player_id: &str,
        round_id: &str,
    ) -> Result<PlayerSnapshot, StatsError> {
        let players = self.players.read().await;
        Ok(players
            .get(player_id)
            .map(|doc| PlayerSnapshot {
                version: doc.version,
                stats: doc.stats.clone(),
                round: doc.rounds.get(round_id).cloned(),
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self, write))]
    async fn commit(
        &self,
        player_id: &str,
        expected_version: u64,
        write: PlayerWrite,
    ) -> Result<u64, StatsError> {
        let mut players = self.players.write().await;
        let doc = players.entry(player_id.to_string()).or_default();

        if doc.version != expected_version {
            warn!(
                player_id,
                expected_version,
                actual_version = doc.version,
                "Stats write conflict in memory"
            );
            return Err(StatsError::WriteConflict(player_id.to_string()));
        }

        doc.version += 1;
        doc.stats = Some(write.stats);
        doc.rounds.insert(write.round.round.id.clone(), write.round);
        doc.history
            .insert(write.history.date_id.clone(), write.history);

        debug!(player_id, version = doc.version, "Stats committed in memory");
        Ok(doc.version)
    }

    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError> {
        let players = self.players.read().await;
        Ok(players.get(player_id).and_then(|doc| doc.stats.clone()))
    }

    async fn get_round(
        &self,
        player_id: &str,
        round_id: &str,
    ) -> Result<Option<RoundRecord>, StatsError> {
        let players = self.players.read().await;
        Ok(players
            .get(player_id)
            .and_then(|doc| doc.rounds.get(round_id).cloned()))
    }

    async fn list_history(&self, player_id: &str) -> Result<Vec<GameHistoryEntry>, StatsError> {
        let players = self.players.read().await;
        Ok(players
            .get(player_id)
            .map(|doc| doc.history.values().rev().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::PlayerRound;
    use crate::trivia::{GameMode, ItemSummary};
    use chrono::Utc;

    fn sample_write(player_id: &str, round_id: &str, date_id: &str, won: bool) -> PlayerWrite {
        let round = PlayerRound {
            id: round_id.to_string(),
            player_id: player_id.to_string(),
            correct_answer: won,
            gave_up: false,
            guesses: Vec::new(),
            guesses_max: 5,
            hints_used: Default::default(),
            difficulty: "LEVEL_3".into(),
            start_date: None,
            trivia_item: ItemSummary {
                id: 9.into(),
                title: "Item".into(),
                poster_path: String::new(),
            },
            game_mode: GameMode::Movies,
            stats_processed: true,
        };
        let mut stats = PlayerStats::new(player_id);
        stats.record_round(won, 1, 100);

        PlayerWrite {
            history: GameHistoryEntry::from_round(&round, date_id, 100, Utc::now()),
            round: RoundRecord { round, score: 100 },
            stats,
        }
    }

    #[tokio::test]
    async fn empty_player_reads_version_zero() {
        let repo = InMemoryStatsRepository::new();
        let snapshot = repo.read_snapshot("nobody", "r").await.unwrap();
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.stats.is_none());
        assert!(snapshot.round.is_none());
    }

    #[tokio::test]
    async fn commit_stores_all_documents() {
        let repo = InMemoryStatsRepository::new();
        let version = repo
            .commit("p1", 0, sample_write("p1", "r1", "2024-01-01", true))
            .await
            .unwrap();
        assert_eq!(version, 1);

        let snapshot = repo.read_snapshot("p1", "r1").await.unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.stats.unwrap().games, 1);
        assert!(snapshot.round.unwrap().round.stats_processed);

        let history = repo.list_history("p1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date_id, "2024-01-01");
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let repo = InMemoryStatsRepository::new();
        repo.commit("p1", 0, sample_write("p1", "r1", "2024-01-01", true))
            .await
            .unwrap();

        let result = repo
            .commit("p1", 0, sample_write("p1", "r2", "2024-01-02", true))
            .await;
        assert!(matches!(result, Err(StatsError::WriteConflict(_))));

        assert!(repo.get_round("p1", "r2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn history_lists_newest_first() {
        let repo = InMemoryStatsRepository::new();
        repo.commit("p1", 0, sample_write("p1", "r1", "2024-01-01", true))
            .await
            .unwrap();
        repo.commit("p1", 1, sample_write("p1", "r2", "2024-01-03", false))
            .await
            .unwrap();
        repo.commit("p1", 2, sample_write("p1", "r3", "2024-01-02", true))
            .await
            .unwrap();

        let dates: Vec<_> = repo
            .list_history("p1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.date_id)
            .collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
    }

    #[tokio::test]
    async fn players_are_isolated() {
        let repo = InMemoryStatsRepository::new();
        repo.commit("p1", 0, sample_write("p1", "r1", "2024-01-01", true))
            .await
            .unwrap();
        repo.commit("p2", 0, sample_write("p2", "r1", "2024-01-01", false))
            .await
            .unwrap();

        assert_eq!(repo.get_player_stats("p1").await.unwrap().unwrap().current_streak, 1);
        assert_eq!(repo.get_player_stats("p2").await.unwrap().unwrap().current_streak, 0);
    }
}
