//! Move selection.
//!
//! [`GreedyPolicy`] looks one move ahead: it evaluates every move that changes
//! the board and picks the highest-scoring one. It ignores the tile that will
//! spawn afterwards, which keeps it fast enough to play thousands of episodes
//! during training.
//!
//! [`RandomPolicy`] picks uniformly among the moves that change the board. It
//! is the baseline for evaluation and the fallback when a learned policy
//! proposes an ineffective move.

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use text2048_engine::{Board, Move};

use crate::{move_analysis::MoveAnalysis, move_evaluator::MoveEvaluator};

pub trait Policy {
    /// Chooses a move for `board`. Returns `None` only on a terminal board.
    fn select_move(&mut self, board: &Board) -> Option<Move>;
}

#[derive(Debug)]
pub struct GreedyPolicy<'a> {
    move_evaluator: Box<dyn MoveEvaluator + 'a>,
}

impl<'a> GreedyPolicy<'a> {
    #[must_use]
    pub fn new(move_evaluator: Box<dyn MoveEvaluator + 'a>) -> Self {
        Self { move_evaluator }
    }

    /// Evaluates every effective move and returns the best with its analysis.
    ///
    /// Ties keep the first move in [`Move::ALL`] order.
    #[must_use]
    pub fn select_best_move(&self, board: &Board) -> Option<(Move, MoveAnalysis)> {
        let mut best_score = f32::MIN;
        let mut best_result = None;

        for mv in Move::ALL {
            let analysis = MoveAnalysis::from_board(board, mv);
            if !analysis.changed() {
                continue;
            }
            let score = self.move_evaluator.evaluate_move(&analysis);
            if best_result.is_none() || score > best_score {
                best_score = score;
                best_result = Some((mv, analysis));
            }
        }

        best_result
    }
}

impl Policy for GreedyPolicy<'_> {
    fn select_move(&mut self, board: &Board) -> Option<Move> {
        self.select_best_move(board).map(|(mv, _)| mv)
    }
}

#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: Pcg32,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn select_move(&mut self, board: &Board) -> Option<Move> {
        let legal = board.legal_moves();
        if legal.is_empty() {
            return None;
        }
        Some(legal[self.rng.random_range(0..legal.len())])
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        board_feature::{ALL_BOARD_FEATURES, BoardFeature, EmptyCells, MoveScore},
        move_evaluator::FeatureBasedMoveEvaluator,
    };

    use super::*;

    fn board(rows: &[[u64; 4]]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_greedy_prefers_merges() {
        let evaluator = FeatureBasedMoveEvaluator::new(vec![&MoveScore as &dyn BoardFeature], vec![1.0]);
        let policy = GreedyPolicy::new(Box::new(evaluator));
        // Only horizontal moves merge the pair.
        let b = board(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let (mv, analysis) = policy.select_best_move(&b).unwrap();
        assert!(matches!(mv, Move::Left | Move::Right));
        assert_eq!(analysis.score_delta(), 4);
    }

    #[test]
    fn test_greedy_skips_ineffective_moves() {
        // A negative weight makes every effective move score below zero.
        let evaluator = FeatureBasedMoveEvaluator::new(vec![&EmptyCells as &dyn BoardFeature], vec![-1.0]);
        let mut policy = GreedyPolicy::new(Box::new(evaluator));
        let b = board(&[[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mv = policy.select_move(&b).unwrap();
        assert!(b.can_shift(mv));
    }

    #[test]
    fn test_policies_return_none_on_terminal_board() {
        let b = board(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let evaluator = FeatureBasedMoveEvaluator::new(
            ALL_BOARD_FEATURES.to_vec(),
            vec![1.0; ALL_BOARD_FEATURES.len()],
        );
        assert_eq!(GreedyPolicy::new(Box::new(evaluator)).select_move(&b), None);
        assert_eq!(RandomPolicy::new(0).select_move(&b), None);
    }

    #[test]
    fn test_random_policy_is_legal_and_seeded() {
        let b = board(&[[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let picks = |seed| {
            let mut policy = RandomPolicy::new(seed);
            (0..32).map(|_| policy.select_move(&b).unwrap()).collect::<Vec<_>>()
        };
        let first = picks(5);
        assert!(first.iter().all(|mv| b.can_shift(*mv)));
        assert!(first.contains(&Move::Down));
        assert!(first.contains(&Move::Right));
        assert_eq!(first, picks(5));
    }
}
