use thiserror::Error;

pub mod player;
pub mod ranking;

/// Unique, case-sensitive player handle. Sole primary key of a player record.
pub type Pseudo = String;

pub type Score = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("player '{0}' already exists")]
    AlreadyExists(Pseudo),

    #[error("player '{0}' does not exist")]
    NotFound(Pseudo),

    #[error("data access error: {0}")]
    DataAccess(String),
}

impl PlayerError {
    pub fn data_access<T, R>(msg: T) -> PlayerResult<R>
    where
        T: Into<String>,
    {
        Err(PlayerError::DataAccess(msg.into()))
    }
}

pub type PlayerResult<T> = Result<T, PlayerError>;
