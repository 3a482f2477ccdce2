use crate::domain::player::{Player, RankedPlayer};

pub trait RankingEngine {
    fn rank(&self, players: Vec<Player>) -> Vec<RankedPlayer>;
}

/// Ranks players by score, highest first.
///
/// Ranks are positional: the n-th player in the sorted sequence gets rank n,
/// so tied scores still receive distinct, consecutive ranks. Ties are ordered
/// by ascending pseudo, which makes the output independent of the order the
/// store returned the players in.
#[derive(Default)]
pub struct ScoreRankingEngine;

impl ScoreRankingEngine {
    pub fn new() -> Self {
        Self {}
    }
}

impl RankingEngine for ScoreRankingEngine {
    fn rank(&self, mut players: Vec<Player>) -> Vec<RankedPlayer> {
        players.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.pseudo.cmp(&b.pseudo))
        });
        players
            .into_iter()
            .enumerate()
            .map(|(index, player)| RankedPlayer {
                pseudo: player.pseudo,
                score: player.score,
                rank: index + 1,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples(ranked: &[RankedPlayer]) -> Vec<(&str, i64, usize)> {
        ranked
            .iter()
            .map(|p| (p.pseudo.as_str(), p.score, p.rank))
            .collect()
    }

    #[test]
    fn test_rank_by_descending_score() {
        let engine = ScoreRankingEngine::new();
        let ranked = engine.rank(vec![
            Player::new("A", 50),
            Player::new("B", 100),
            Player::new("C", 75),
        ]);
        assert_eq!(
            triples(&ranked),
            vec![("B", 100, 1), ("C", 75, 2), ("A", 50, 3)]
        );
    }

    #[test]
    fn test_ties_get_consecutive_ranks_ordered_by_pseudo() {
        let engine = ScoreRankingEngine::new();
        let ranked = engine.rank(vec![
            Player::new("zoe", 10),
            Player::new("bob", 20),
            Player::new("amy", 10),
            Player::new("Zed", 10),
        ]);
        assert_eq!(
            triples(&ranked),
            vec![("bob", 20, 1), ("Zed", 10, 2), ("amy", 10, 3), ("zoe", 10, 4)]
        );
    }

    #[test]
    fn test_rank_is_independent_of_input_order() {
        let engine = ScoreRankingEngine::new();
        let players = vec![
            Player::new("a", 3),
            Player::new("b", 3),
            Player::new("c", -1),
            Player::new("d", 7),
        ];
        let mut reversed = players.clone();
        reversed.reverse();
        assert_eq!(engine.rank(players), engine.rank(reversed));
    }

    #[test]
    fn test_rank_empty() {
        assert!(ScoreRankingEngine::new().rank(Vec::new()).is_empty());
    }
}
