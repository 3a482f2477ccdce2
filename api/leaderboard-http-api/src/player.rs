use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use leaderboard_app::domain::{
    PlayerError, Score,
    player::{DEFAULT_SCORE, RankedPlayer},
};
use log::{error, info};

use crate::{AppState, error::ApiError};

#[derive(serde::Deserialize)]
pub struct JsonPlayerRequest {
    pseudo: String,
    #[serde(default = "default_score")]
    score: Score,
}

fn default_score() -> Score {
    DEFAULT_SCORE
}

#[derive(serde::Serialize, Clone, Debug, PartialEq, Eq)]
pub struct JsonRankedPlayerResponse {
    pseudo: String,
    score: Score,
    rank: usize,
}

impl From<RankedPlayer> for JsonRankedPlayerResponse {
    fn from(player: RankedPlayer) -> Self {
        Self {
            pseudo: player.pseudo,
            score: player.score,
            rank: player.rank,
        }
    }
}

fn parse_request(
    request: Result<Json<JsonPlayerRequest>, JsonRejection>,
) -> Result<JsonPlayerRequest, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if request.pseudo.trim().is_empty() {
        return Err(ApiError::BadRequest("pseudo must not be empty".to_string()));
    }
    Ok(request)
}

fn log_failure(action: &str, e: &PlayerError) {
    match e {
        PlayerError::DataAccess(_) => error!("Cannot {}: '{}'", action, e),
        _ => info!("Cannot {}: '{}'", action, e),
    }
}

pub async fn add_player(
    State(app_state): State<AppState>,
    request: Result<Json<JsonPlayerRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = parse_request(request)?;
    app_state
        .app
        .player_service
        .add_player(&request.pseudo, request.score)
        .await
        .inspect_err(|e| log_failure("add player", e))?;
    info!("New player with pseudo '{}' added", request.pseudo);
    Ok(StatusCode::CREATED)
}

pub async fn update_player_score(
    State(app_state): State<AppState>,
    request: Result<Json<JsonPlayerRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = parse_request(request)?;
    app_state
        .app
        .player_service
        .update_player_score(&request.pseudo, request.score)
        .await
        .inspect_err(|e| log_failure("update player score", e))?;
    info!(
        "Updated score of player '{}' to '{}'",
        request.pseudo, request.score
    );
    Ok(StatusCode::OK)
}

pub async fn get_all_sorted_players(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonRankedPlayerResponse>>, ApiError> {
    let players = app_state
        .app
        .player_service
        .get_all_sorted_players()
        .await
        .inspect_err(|e| log_failure("list players", e))?;
    Ok(Json(players.into_iter().map(Into::into).collect()))
}

pub async fn get_player(
    Path(pseudo): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<JsonRankedPlayerResponse>, ApiError> {
    if pseudo.is_empty() {
        return Err(missing_pseudo());
    }
    let player = app_state
        .app
        .player_service
        .get_player(&pseudo)
        .await
        .inspect_err(|e| log_failure("retrieve player information", e))?;
    Ok(Json(player.into()))
}

pub async fn get_player_without_pseudo() -> ApiError {
    missing_pseudo()
}

fn missing_pseudo() -> ApiError {
    ApiError::BadRequest("pseudo must not be empty".to_string())
}

pub async fn delete_all_players(
    State(app_state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    app_state
        .app
        .player_service
        .delete_all_players()
        .await
        .inspect_err(|e| log_failure("delete all players", e))?;
    info!("All players have been removed");
    Ok(StatusCode::OK)
}
