use std::sync::Arc;

use log::info;

use crate::{
    domain::{PlayerError, PlayerResult, Score, player::Player},
    ports::store::{
        AttributeType, AttributeValue, Mutation, Record, Store, StoreError, TableSchema,
    },
};

pub mod blocking;

use blocking::BlockingStore;

pub const PLAYER_TABLE_NAME: &str = "player";
pub const ATTR_PSEUDO: &str = "pseudo";
pub const ATTR_SCORE: &str = "score";

/// Layout of the player collection: key `pseudo` (string), attribute `score` (number).
pub fn player_table_schema(table: impl Into<String>) -> TableSchema {
    TableSchema {
        table: table.into(),
        key: ATTR_PSEUDO.to_string(),
        attributes: vec![(ATTR_SCORE.to_string(), AttributeType::N)],
    }
}

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn find_all(&self) -> PlayerResult<Vec<Player>>;
    async fn save(&self, pseudo: &str, score: Score) -> PlayerResult<()>;
    async fn update_score(&self, pseudo: &str, new_score: Score) -> PlayerResult<()>;
    async fn delete_all(&self) -> PlayerResult<()>;
}

pub struct StorePlayerRepository<S> {
    store: BlockingStore<S>,
}

impl<S: Store + Send + Sync + 'static> StorePlayerRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store: BlockingStore::new(store),
        }
    }

    fn player_to_record(pseudo: &str, score: Score) -> Record {
        Record::from([
            (ATTR_PSEUDO.to_string(), AttributeValue::S(pseudo.to_string())),
            (ATTR_SCORE.to_string(), AttributeValue::N(score)),
        ])
    }

    fn pseudo_from_record(record: &Record) -> PlayerResult<String> {
        match record.get(ATTR_PSEUDO).and_then(AttributeValue::as_s) {
            Some(pseudo) => Ok(pseudo.to_string()),
            None => PlayerError::data_access(format!(
                "malformed player record: missing string attribute '{}'",
                ATTR_PSEUDO
            )),
        }
    }

    fn player_from_record(record: &Record) -> PlayerResult<Player> {
        let pseudo = Self::pseudo_from_record(record)?;
        let Some(score) = record.get(ATTR_SCORE).and_then(AttributeValue::as_n) else {
            return PlayerError::data_access(format!(
                "malformed player record '{}': missing number attribute '{}'",
                pseudo, ATTR_SCORE
            ));
        };
        Ok(Player { pseudo, score })
    }
}

#[async_trait::async_trait]
impl<S: Store + Send + Sync + 'static> PlayerRepository for StorePlayerRepository<S> {
    async fn find_all(&self) -> PlayerResult<Vec<Player>> {
        let records = self.store.scan_all().await.map_err(|e| {
            PlayerError::DataAccess(format!("Players cannot be retrieved. Cause: {}", e))
        })?;
        let players = records
            .iter()
            .map(Self::player_from_record)
            .collect::<PlayerResult<Vec<Player>>>()?;
        info!("{} players have been found in the database", players.len());
        Ok(players)
    }

    async fn save(&self, pseudo: &str, score: Score) -> PlayerResult<()> {
        let record = Self::player_to_record(pseudo, score);
        match self.store.conditional_put(pseudo.to_string(), record).await {
            Ok(()) => {
                info!(
                    "The player '{}' with a score of '{}' has been created in the database",
                    pseudo, score
                );
                Ok(())
            }
            Err(StoreError::ConditionViolation) => {
                Err(PlayerError::AlreadyExists(pseudo.to_string()))
            }
            Err(StoreError::Backend(e)) => PlayerError::data_access(format!(
                "Player cannot be added to database. Cause: {}",
                e
            )),
        }
    }

    async fn update_score(&self, pseudo: &str, new_score: Score) -> PlayerResult<()> {
        let mutation = Mutation::new().set(ATTR_SCORE, AttributeValue::N(new_score));
        match self
            .store
            .conditional_update(pseudo.to_string(), mutation)
            .await
        {
            Ok(()) => {
                info!(
                    "The score of the player '{}' has been updated to '{}'",
                    pseudo, new_score
                );
                Ok(())
            }
            Err(StoreError::ConditionViolation) => Err(PlayerError::NotFound(pseudo.to_string())),
            Err(StoreError::Backend(e)) => PlayerError::data_access(format!(
                "The new score '{}' of the player '{}' cannot be updated. Cause: {}",
                new_score, pseudo, e
            )),
        }
    }

    // Scan-then-delete, one key at a time. Not atomic: a failure part way
    // through leaves the remaining records in place.
    async fn delete_all(&self) -> PlayerResult<()> {
        let records = self.store.scan_all().await.map_err(|e| {
            PlayerError::DataAccess(format!("Players cannot be deleted. Cause: {}", e))
        })?;
        for record in &records {
            let pseudo = Self::pseudo_from_record(record)?;
            self.store.delete(pseudo).await.map_err(|e| {
                PlayerError::DataAccess(format!("Players cannot be deleted. Cause: {}", e))
            })?;
        }
        info!(
            "All players have been removed from the database ({} deleted)",
            records.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        adapters::memory_store::MemoryStore,
        ports::store::mock::{FailOn, FailingStore},
    };

    use super::*;

    fn repository() -> (Arc<MemoryStore>, StorePlayerRepository<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), StorePlayerRepository::new(store))
    }

    #[tokio::test]
    async fn test_save_then_find_all() {
        let (_, repo) = repository();
        repo.save("alice", 42).await.unwrap();
        assert_eq!(repo.find_all().await.unwrap(), vec![Player::new("alice", 42)]);
    }

    #[tokio::test]
    async fn test_save_existing_pseudo_keeps_first_score() {
        let (_, repo) = repository();
        repo.save("alice", 1).await.unwrap();
        assert_eq!(
            repo.save("alice", 2).await,
            Err(PlayerError::AlreadyExists("alice".to_string()))
        );
        assert_eq!(repo.find_all().await.unwrap(), vec![Player::new("alice", 1)]);
    }

    #[tokio::test]
    async fn test_pseudo_is_case_sensitive() {
        let (_, repo) = repository();
        repo.save("Alice", 1).await.unwrap();
        repo.save("alice", 2).await.unwrap();
        assert_eq!(repo.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_score_of_unknown_player() {
        let (store, repo) = repository();
        assert_eq!(
            repo.update_score("ghost", 9).await,
            Err(PlayerError::NotFound("ghost".to_string()))
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_update_score() {
        let (_, repo) = repository();
        repo.save("X", 5).await.unwrap();
        repo.update_score("X", 9).await.unwrap();
        assert_eq!(repo.find_all().await.unwrap(), vec![Player::new("X", 9)]);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let (_, repo) = repository();
        for (pseudo, score) in [("a", 1), ("b", 2), ("c", 3)] {
            repo.save(pseudo, score).await.unwrap();
        }
        repo.delete_all().await.unwrap();
        assert!(repo.find_all().await.unwrap().is_empty());
        assert!(repo.delete_all().await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_saves_single_winner() {
        let (_, repo) = repository();
        let repo = Arc::new(repo);
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.save("racer", i).await })
            })
            .collect();
        let mut ok = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => ok += 1,
                Err(e) => assert_eq!(e, PlayerError::AlreadyExists("racer".to_string())),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_record_is_data_access_error() {
        let (store, repo) = repository();
        store
            .conditional_put(
                "broken",
                Record::from([(
                    ATTR_PSEUDO.to_string(),
                    AttributeValue::S("broken".to_string()),
                )]),
            )
            .unwrap();
        assert!(matches!(
            repo.find_all().await,
            Err(PlayerError::DataAccess(..))
        ));
    }

    #[tokio::test]
    async fn test_backend_failures_are_data_access_errors() {
        let memory = Arc::new(MemoryStore::new());
        memory
            .conditional_put("a", StorePlayerRepository::<MemoryStore>::player_to_record("a", 1))
            .unwrap();

        for fail_on in [FailOn::Scan, FailOn::Put, FailOn::Update] {
            let repo =
                StorePlayerRepository::new(Arc::new(FailingStore::new(memory.clone(), fail_on)));
            let result = match fail_on {
                FailOn::Scan => repo.find_all().await.map(|_| ()),
                FailOn::Put => repo.save("a", 3).await,
                _ => repo.update_score("a", 3).await,
            };
            assert!(matches!(result, Err(PlayerError::DataAccess(..))));
        }
        // a failed put on an existing key must not be reported as a conflict,
        // and a failed update must not touch the record
        assert_eq!(
            StorePlayerRepository::new(memory).find_all().await.unwrap(),
            vec![Player::new("a", 1)]
        );
    }

    #[tokio::test]
    async fn test_delete_all_failure_leaves_partial_state() {
        let memory = Arc::new(MemoryStore::new());
        let seed = StorePlayerRepository::new(memory.clone());
        for (pseudo, score) in [("a", 1), ("b", 2), ("c", 3)] {
            seed.save(pseudo, score).await.unwrap();
        }

        let repo = StorePlayerRepository::new(Arc::new(FailingStore::new(
            memory.clone(),
            FailOn::DeleteAfter(1),
        )));
        assert!(matches!(
            repo.delete_all().await,
            Err(PlayerError::DataAccess(..))
        ));
        assert_eq!(memory.len(), 2);
    }
}
