use crate::domain::{Pseudo, Score};

pub const DEFAULT_SCORE: Score = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub pseudo: Pseudo,
    pub score: Score,
}

impl Player {
    pub fn new(pseudo: impl Into<Pseudo>, score: Score) -> Self {
        Self {
            pseudo: pseudo.into(),
            score,
        }
    }
}

/// A player together with its position in the leaderboard.
///
/// Computed on every ranking query and never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedPlayer {
    pub pseudo: Pseudo,
    pub score: Score,
    pub rank: usize,
}
