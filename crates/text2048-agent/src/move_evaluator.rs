//! Move evaluation: scoring the board a single move produces.
//!
//! [`FeatureBasedMoveEvaluator`] computes
//!
//! ```text
//! score = w₁·f₁ + w₂·f₂ + ... + wₙ·fₙ
//! ```
//!
//! where `fᵢ` are normalized [`board_feature`](crate::board_feature) values and
//! `wᵢ` are weights learned by the trainer.

use std::{collections::BTreeMap, fmt, iter};

use crate::{
    board_feature::{ALL_BOARD_FEATURES, BoardFeature, feature_by_id},
    move_analysis::MoveAnalysis,
};

/// Assigns a score to a candidate move (higher is better).
pub trait MoveEvaluator: fmt::Debug + Send + Sync {
    fn evaluate_move(&self, analysis: &MoveAnalysis) -> f32;
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown board feature '{id}'")]
pub struct UnknownFeatureError {
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct FeatureBasedMoveEvaluator {
    features: Vec<&'static dyn BoardFeature>,
    weights: Vec<f32>,
}

impl FeatureBasedMoveEvaluator {
    /// # Panics
    ///
    /// Panics if `features.len() != weights.len()`
    #[must_use]
    pub fn new(features: Vec<&'static dyn BoardFeature>, weights: Vec<f32>) -> Self {
        assert_eq!(features.len(), weights.len());
        Self { features, weights }
    }

    /// Builds an evaluator over [`ALL_BOARD_FEATURES`] from weights keyed by
    /// feature id. Features missing from the map get a weight of zero.
    pub fn from_weight_map(weights: &BTreeMap<String, f32>) -> Result<Self, UnknownFeatureError> {
        if let Some(id) = weights.keys().find(|id| feature_by_id(id).is_none()) {
            return Err(UnknownFeatureError { id: id.clone() });
        }
        let weights = ALL_BOARD_FEATURES
            .iter()
            .map(|f| weights.get(f.id()).copied().unwrap_or(0.0))
            .collect();
        Ok(Self::new(ALL_BOARD_FEATURES.to_vec(), weights))
    }

    #[must_use]
    pub fn features(&self) -> &[&'static dyn BoardFeature] {
        &self.features
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weights keyed by feature id, as stored in model files.
    #[must_use]
    pub fn weight_map(&self) -> BTreeMap<String, f32> {
        iter::zip(&self.features, &self.weights)
            .map(|(f, w)| (f.id().to_owned(), *w))
            .collect()
    }
}

impl MoveEvaluator for FeatureBasedMoveEvaluator {
    #[inline]
    fn evaluate_move(&self, analysis: &MoveAnalysis) -> f32 {
        iter::zip(&self.features, &self.weights)
            .map(|(f, w)| f.compute(analysis) * w)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use text2048_engine::{Board, Move};

    use super::*;

    #[test]
    fn test_weighted_sum() {
        let board = Board::from_rows(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let analysis = MoveAnalysis::from_board(&board, Move::Left);
        let expected = ALL_BOARD_FEATURES
            .iter()
            .map(|f| f.compute(&analysis) * 0.5)
            .sum::<f32>();

        let evaluator =
            FeatureBasedMoveEvaluator::new(ALL_BOARD_FEATURES.to_vec(), vec![0.5; ALL_BOARD_FEATURES.len()]);
        assert!((evaluator.evaluate_move(&analysis) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_weight_map_roundtrip() {
        let mut weights = BTreeMap::new();
        weights.insert("empty_cells".to_owned(), 0.7);
        weights.insert("move_score".to_owned(), 0.3);
        let evaluator = FeatureBasedMoveEvaluator::from_weight_map(&weights).unwrap();
        assert_eq!(evaluator.features().len(), ALL_BOARD_FEATURES.len());

        let map = evaluator.weight_map();
        assert_eq!(map.len(), ALL_BOARD_FEATURES.len());
        assert!((map["empty_cells"] - 0.7).abs() < f32::EPSILON);
        assert!(map["smoothness"].abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_feature() {
        let mut weights = BTreeMap::new();
        weights.insert("num_holes".to_owned(), 1.0);
        let err = FeatureBasedMoveEvaluator::from_weight_map(&weights).unwrap_err();
        assert_eq!(err.to_string(), "unknown board feature 'num_holes'");
    }

    #[test]
    #[should_panic(expected = "assertion")]
    fn test_mismatched_lengths_panic() {
        let _ = FeatureBasedMoveEvaluator::new(ALL_BOARD_FEATURES.to_vec(), vec![1.0]);
    }
}
