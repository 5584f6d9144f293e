use serde::{Deserialize, Serialize};

/// Maps a step's merge score to a reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardShaping {
    /// The score delta itself.
    #[default]
    MergeScore,
    /// `log2(1 + delta)`, which keeps late-game rewards in a narrow range.
    Log2MergeScore,
}

impl RewardShaping {
    #[must_use]
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn reward(self, score_delta: u64) -> f32 {
        match self {
            Self::MergeScore => score_delta as f32,
            Self::Log2MergeScore => (1.0 + score_delta as f64).log2() as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewards() {
        assert!((RewardShaping::MergeScore.reward(12) - 12.0).abs() < f32::EPSILON);
        assert!(RewardShaping::Log2MergeScore.reward(0).abs() < f32::EPSILON);
        assert!((RewardShaping::Log2MergeScore.reward(3) - 2.0).abs() < 1e-6);
    }
}
