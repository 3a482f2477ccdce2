use std::sync::Arc;

use crate::{
    domain::{
        PlayerError, PlayerResult, Score,
        player::RankedPlayer,
        ranking::RankingEngine,
    },
    repository::PlayerRepository,
};

#[async_trait::async_trait]
pub trait PlayerService {
    async fn add_player(&self, pseudo: &str, score: Score) -> PlayerResult<()>;
    async fn update_player_score(&self, pseudo: &str, new_score: Score) -> PlayerResult<()>;
    async fn get_player(&self, pseudo: &str) -> PlayerResult<RankedPlayer>;
    async fn get_all_sorted_players(&self) -> PlayerResult<Vec<RankedPlayer>>;
    async fn delete_all_players(&self) -> PlayerResult<()>;
}

pub struct PlayerServiceImpl<R: PlayerRepository, E: RankingEngine> {
    player_repository: Arc<R>,
    ranking_engine: Arc<E>,
}

impl<R: PlayerRepository, E: RankingEngine> PlayerServiceImpl<R, E> {
    pub fn new(player_repository: Arc<R>, ranking_engine: Arc<E>) -> Self {
        Self {
            player_repository,
            ranking_engine,
        }
    }
}

#[async_trait::async_trait]
impl<R, E> PlayerService for PlayerServiceImpl<R, E>
where
    R: PlayerRepository + Send + Sync + 'static,
    E: RankingEngine + Send + Sync + 'static,
{
    async fn add_player(&self, pseudo: &str, score: Score) -> PlayerResult<()> {
        self.player_repository.save(pseudo, score).await
    }

    async fn update_player_score(&self, pseudo: &str, new_score: Score) -> PlayerResult<()> {
        self.player_repository.update_score(pseudo, new_score).await
    }

    async fn get_player(&self, pseudo: &str) -> PlayerResult<RankedPlayer> {
        self.get_all_sorted_players()
            .await?
            .into_iter()
            .find(|player| player.pseudo == pseudo)
            .ok_or_else(|| PlayerError::NotFound(pseudo.to_string()))
    }

    async fn get_all_sorted_players(&self) -> PlayerResult<Vec<RankedPlayer>> {
        let players = self.player_repository.find_all().await?;
        Ok(self.ranking_engine.rank(players))
    }

    async fn delete_all_players(&self) -> PlayerResult<()> {
        self.player_repository.delete_all().await
    }
}
