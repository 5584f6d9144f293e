use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use text2048_agent::{board_feature::BoardFeature, move_evaluator::FeatureBasedMoveEvaluator};

use crate::util::{self, Output};

/// A trained model as stored on disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AiModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_fitness: f32,
    /// Move evaluator weights keyed by board feature id.
    pub weights: BTreeMap<String, f32>,
}

impl AiModel {
    pub fn new(name: &str, final_fitness: f32, weights: BTreeMap<String, f32>) -> Self {
        Self {
            name: name.to_owned(),
            trained_at: Utc::now(),
            final_fitness,
            weights,
        }
    }

    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("AI model", path)
    }

    pub fn save<P>(&self, path: P) -> anyhow::Result<()>
    where
        P: AsRef<Path>,
    {
        Output::create(path.as_ref().to_owned())?.write_json(self)
    }

    pub fn to_move_evaluator(&self) -> anyhow::Result<FeatureBasedMoveEvaluator> {
        FeatureBasedMoveEvaluator::from_weight_map(&self.weights)
            .with_context(|| format!("Invalid weights in AI model '{}'", self.name))
    }

    /// Weights ordered like `features`. Missing features get zero.
    pub fn weights_for(&self, features: &[&'static dyn BoardFeature]) -> anyhow::Result<Vec<f32>> {
        // Reject unknown ids the same way loading an evaluator does.
        self.to_move_evaluator()?;
        Ok(features
            .iter()
            .map(|f| self.weights.get(f.id()).copied().unwrap_or(0.0))
            .collect())
    }
}
