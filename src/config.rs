use std::{collections::HashMap, path::PathBuf};

use thiserror::Error;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_DB_PATH: &str = "leaderboard.db";
const DEFAULT_DB_POOL_SIZE: u32 = 5;
const DEFAULT_TABLE: &str = "player";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Sqlite {
        path: PathBuf,
        pool_size: u32,
        table: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub file_path: Option<String>,
    pub archive_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub http_host: String,
    pub http_port: u16,
    pub store: StoreConfig,
    pub log: LogConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let var = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let http_host = var("LEADERBOARD_HTTP_HOST")
            .unwrap_or(DEFAULT_HTTP_HOST)
            .to_string();

        let http_port = match var("LEADERBOARD_HTTP_PORT") {
            Some(val) => val.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "LEADERBOARD_HTTP_PORT",
                value: val.to_string(),
                reason: "expected a port number",
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        let store = match var("LEADERBOARD_STORE").unwrap_or("sqlite") {
            "memory" => StoreConfig::Memory,
            "sqlite" => {
                let pool_size = match var("LEADERBOARD_DB_POOL_SIZE") {
                    Some(val) => match val.parse::<u32>() {
                        Ok(size) if size > 0 => size,
                        _ => {
                            return Err(ConfigError::InvalidValue {
                                name: "LEADERBOARD_DB_POOL_SIZE",
                                value: val.to_string(),
                                reason: "expected a positive integer",
                            });
                        }
                    },
                    None => DEFAULT_DB_POOL_SIZE,
                };

                let table = var("LEADERBOARD_TABLE").unwrap_or(DEFAULT_TABLE);
                if !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                    || table.starts_with(|c: char| c.is_ascii_digit())
                {
                    return Err(ConfigError::InvalidValue {
                        name: "LEADERBOARD_TABLE",
                        value: table.to_string(),
                        reason: "expected letters, digits or underscores",
                    });
                }

                StoreConfig::Sqlite {
                    path: PathBuf::from(var("LEADERBOARD_DB_PATH").unwrap_or(DEFAULT_DB_PATH)),
                    pool_size,
                    table: table.to_string(),
                }
            }
            other => {
                return Err(ConfigError::InvalidValue {
                    name: "LEADERBOARD_STORE",
                    value: other.to_string(),
                    reason: "expected 'sqlite' or 'memory'",
                });
            }
        };

        let log = LogConfig {
            file_path: var("LOG_FILE_PATH").map(str::to_string),
            archive_pattern: var("LOG_ARCHIVE_PATTERN").map(str::to_string),
        };

        Ok(Self {
            http_host,
            http_port,
            store,
            log,
        })
    }
}
