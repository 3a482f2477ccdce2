use std::sync::Arc;

use leaderboard_app::{
    Application, adapters::memory_store::MemoryStore, build_application,
    repository::player_table_schema,
};
use leaderboard_persistence_sqlite::SqliteStore;
use log::{error, info};

use crate::config::{ServerConfig, StoreConfig};

mod config;
mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

fn build_from_config(config: &ServerConfig) -> Result<Application, Box<dyn std::error::Error>> {
    let app = match &config.store {
        StoreConfig::Memory => {
            info!("Using in-memory player store; data is lost on shutdown");
            build_application(Arc::new(MemoryStore::new()))
        }
        StoreConfig::Sqlite {
            path,
            pool_size,
            table,
        } => {
            let store = SqliteStore::open(path, *pool_size, player_table_schema(table.as_str()))?;
            build_application(Arc::new(store))
        }
    };
    Ok(app)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logs::init_logger(&config.log) {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    let app = match build_from_config(&config) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("Failed to open player store: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting application");

    if let Err(e) = leaderboard_http_api::run(
        app,
        &config.http_host,
        config.http_port,
        shutdown_signal(),
    )
    .await
    {
        error!("HTTP API failed: {}", e);
        std::process::exit(1);
    }
}
