use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use leaderboard_app::Application;
use log::info;
use tokio::net::TcpListener;

mod error;
mod player;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
}

pub fn router(app: Arc<Application>) -> Router {
    Router::new()
        .route(
            "/player",
            post(player::add_player)
                .put(player::update_player_score)
                .get(player::get_player_without_pseudo),
        )
        .route("/player/", get(player::get_player_without_pseudo))
        .route("/player/{pseudo}", get(player::get_player))
        .route(
            "/players",
            get(player::get_all_sorted_players).delete(player::delete_all_players),
        )
        .with_state(AppState { app })
}

/// Serves the API on an already bound listener until `shutdown_signal` resolves.
pub async fn serve(
    app: Arc<Application>,
    listener: TcpListener,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("API server listening on {}", addr);
    }
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP API shut down gracefully");
    Ok(())
}

pub async fn run(
    app: Arc<Application>,
    host: &str,
    port: u16,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    serve(app, listener, shutdown_signal).await
}
