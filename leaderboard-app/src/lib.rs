use std::sync::Arc;

use crate::{
    domain::ranking::ScoreRankingEngine,
    ports::store::Store,
    repository::StorePlayerRepository,
    services::player::{PlayerService, PlayerServiceImpl},
};

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod repository;
pub mod services;

pub struct Application {
    pub player_service: Arc<dyn PlayerService + Send + Sync + 'static>,
}

pub fn build_application<S: Store + Send + Sync + 'static>(store: Arc<S>) -> Application {
    let player_repository = Arc::new(StorePlayerRepository::new(store));
    let ranking_engine = Arc::new(ScoreRankingEngine::new());

    let player_service = Arc::new(PlayerServiceImpl::new(player_repository, ranking_engine));

    Application { player_service }
}
