//! Genetic algorithm over feature weights.
//!
//! One generation:
//!
//! 1. **Evaluate** - every individual drives a [`GreedyPolicy`] through the
//!    same starting engines and receives the mean episode fitness
//! 2. **Elitism** - the best individuals move on unchanged
//! 3. **Tournament selection** - parents are the fittest of a random sample
//! 4. **BLX-α crossover** and **Gaussian mutation** produce a child
//! 5. **L1 normalization** keeps the child on the weight simplex
//!
//! Evaluation runs one scoped thread per individual. Each thread clones its
//! starting engines, so threads share nothing mutable.

use std::{cmp::Ordering, thread};

use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};
use text2048_agent::{
    board_feature::BoardFeature, episode_evaluator::EpisodeEvaluator,
    move_evaluator::FeatureBasedMoveEvaluator, policy::GreedyPolicy, summary::Summary,
};
use text2048_engine::GridEngine;

use crate::weights;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    weights: Vec<f32>,
    fitness: f32,
}

impl Individual {
    /// Random weights in `[0.0, max_weight]`, L1-normalized.
    pub fn random<R>(rng: &mut R, max_weight: f32, feature_count: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::from_weights(weights::random(rng, max_weight, feature_count))
    }

    /// An unevaluated individual with the given weights, L1-normalized.
    #[must_use]
    pub fn from_weights(mut weights: Vec<f32>) -> Self {
        weights::normalize_l1(&mut weights);
        Self {
            weights,
            fitness: f32::MIN,
        }
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    fn cmp_fitness(&self, other: &Self) -> Ordering {
        self.fitness.total_cmp(&other.fitness)
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    features: Vec<&'static dyn BoardFeature>,
    individuals: Vec<Individual>,
}

impl Population {
    #[must_use]
    pub fn random<R>(
        features: Vec<&'static dyn BoardFeature>,
        count: usize,
        rng: &mut R,
        max_weight: f32,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::random(rng, max_weight, features.len()))
            .collect();
        Self {
            features,
            individuals,
        }
    }

    #[must_use]
    pub fn features(&self) -> &[&'static dyn BoardFeature] {
        &self.features
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Replaces the last individual with `individual`.
    ///
    /// # Panics
    ///
    /// Panics if the weight count does not match the feature count.
    pub fn inject(&mut self, individual: Individual) {
        assert_eq!(individual.weights.len(), self.features.len());
        match self.individuals.last_mut() {
            Some(last) => *last = individual,
            None => self.individuals.push(individual),
        }
    }

    /// Evaluates every individual in parallel, then sorts the population by
    /// fitness, best first.
    pub fn evaluate_fitness<E>(&mut self, engines: &[GridEngine], episode_evaluator: &E)
    where
        E: EpisodeEvaluator + ?Sized,
    {
        thread::scope(|s| {
            for ind in &mut self.individuals {
                let move_evaluator =
                    FeatureBasedMoveEvaluator::new(self.features.clone(), ind.weights.clone());
                s.spawn(move || {
                    let mut policy = GreedyPolicy::new(Box::new(move_evaluator));
                    ind.fitness = episode_evaluator.play_and_evaluate_episodes(engines, &mut policy);
                });
            }
        });

        self.individuals.sort_by(|a, b| b.cmp_fitness(a));
    }

    /// The fittest individual. Meaningful after [`Self::evaluate_fitness`].
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Per-feature statistics of the weights across the population.
    #[must_use]
    pub fn weight_summaries(&self) -> Vec<Summary> {
        (0..self.features.len())
            .map(|i| {
                Summary::new(self.individuals.iter().map(|ind| ind.weights[i])).unwrap_or_default()
            })
            .collect()
    }

    #[must_use]
    pub fn fitness_summary(&self) -> Summary {
        Summary::new(self.individuals.iter().map(|ind| ind.fitness)).unwrap_or_default()
    }
}

/// Genetic operator parameters for one generation.
#[derive(Debug, Clone, Copy)]
pub struct PopulationEvolver {
    /// Individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Upper clamp for every weight before normalization.
    pub max_weight: f32,
    pub tournament_size: usize,
    pub mutation_sigma: f32,
    pub blx_alpha: f32,
    /// Per-weight mutation probability.
    pub mutation_rate: f32,
}

impl PopulationEvolver {
    /// Builds the next generation from a population sorted best first.
    ///
    /// # Panics
    ///
    /// Panics if the population is not sorted by fitness.
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let current = &population.individuals;
        assert!(current.is_sorted_by(|a, b| a.cmp_fitness(b).is_ge()));

        let mut next = Vec::with_capacity(current.len());
        next.extend(current.iter().take(self.elite_count).cloned());

        while next.len() < current.len() {
            let (Some(p1), Some(p2)) = (
                tournament_select(current, self.tournament_size, rng),
                tournament_select(current, self.tournament_size, rng),
            ) else {
                break;
            };
            let mut child = weights::blx_alpha(
                &p1.weights,
                &p2.weights,
                self.blx_alpha,
                self.max_weight,
                rng,
            );
            weights::mutate(
                &mut child,
                self.mutation_sigma,
                self.max_weight,
                self.mutation_rate,
                rng,
            );
            next.push(Individual::from_weights(child));
        }

        Population {
            features: population.features.clone(),
            individuals: next,
        }
    }
}

/// The fittest of `tournament_size` distinct individuals drawn at random.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a Individual>
where
    R: Rng + ?Sized,
{
    population
        .choose_multiple(rng, tournament_size.max(1))
        .max_by(|a, b| a.cmp_fitness(b))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use text2048_agent::{
        board_feature::{ALL_BOARD_FEATURES, EmptyCells, MoveScore},
        episode_evaluator::{DefaultEpisodeEvaluator, ScoreFitness},
    };
    use text2048_engine::{EngineConfig, TileSeed};

    use super::*;

    fn evolver() -> PopulationEvolver {
        PopulationEvolver {
            elite_count: 2,
            max_weight: 0.5,
            tournament_size: 2,
            mutation_sigma: 0.05,
            blx_alpha: 0.2,
            mutation_rate: 0.3,
        }
    }

    fn evaluated(fitness: &[f32]) -> Population {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut population = Population::random(ALL_BOARD_FEATURES.to_vec(), fitness.len(), &mut rng, 1.0);
        for (ind, f) in population.individuals.iter_mut().zip(fitness) {
            ind.fitness = *f;
        }
        population.individuals.sort_by(|a, b| b.cmp_fitness(a));
        population
    }

    #[test]
    fn test_random_individuals_are_normalized() {
        let mut rng = Pcg32::seed_from_u64(0);
        let population = Population::random(ALL_BOARD_FEATURES.to_vec(), 5, &mut rng, 0.5);
        assert_eq!(population.individuals().len(), 5);
        for ind in population.individuals() {
            assert_eq!(ind.weights().len(), ALL_BOARD_FEATURES.len());
            assert!((ind.weights().iter().sum::<f32>() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_evolve_keeps_elites_and_size() {
        let population = evaluated(&[5.0, 1.0, 3.0, 4.0, 2.0]);
        let mut rng = Pcg32::seed_from_u64(1);
        let next = evolver().evolve(&population, &mut rng);
        assert_eq!(next.individuals().len(), 5);
        assert_eq!(next.individuals()[..2], population.individuals()[..2]);
        for ind in &next.individuals()[2..] {
            assert!((ind.weights().iter().sum::<f32>() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_evolve_is_reproducible() {
        let population = evaluated(&[3.0, 2.0, 1.0, 0.0]);
        let a = evolver().evolve(&population, &mut Pcg32::seed_from_u64(7));
        let b = evolver().evolve(&population, &mut Pcg32::seed_from_u64(7));
        assert_eq!(a.individuals(), b.individuals());
    }

    #[test]
    #[should_panic(expected = "is_sorted_by")]
    fn test_evolve_requires_sorted_population() {
        let mut population = evaluated(&[1.0, 2.0]);
        population.individuals.reverse();
        let _ = evolver().evolve(&population, &mut Pcg32::seed_from_u64(0));
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let population = evaluated(&[9.0, 1.0, 0.0]);
        let mut rng = Pcg32::seed_from_u64(2);
        let winner = tournament_select(population.individuals(), 3, &mut rng).unwrap();
        assert!((winner.fitness() - 9.0).abs() < f32::EPSILON);
        assert!(tournament_select(&[], 2, &mut rng).is_none());
    }

    #[test]
    fn test_evaluate_fitness_sorts_best_first() {
        let features = vec![&EmptyCells as &dyn BoardFeature, &MoveScore];
        let mut population = Population {
            features,
            individuals: vec![
                Individual::from_weights(vec![0.0, 0.0]),
                Individual::from_weights(vec![0.7, 0.3]),
            ],
        };
        let engines = (0..2)
            .map(|seed| GridEngine::new(EngineConfig::default(), TileSeed::from(seed)).unwrap())
            .collect::<Vec<_>>();
        let evaluator = DefaultEpisodeEvaluator::new(200, ScoreFitness::new());
        population.evaluate_fitness(&engines, &evaluator);

        let individuals = population.individuals();
        assert!(individuals[0].fitness() >= individuals[1].fitness());
        assert!(individuals.iter().all(|ind| ind.fitness() > 0.0));
        assert_eq!(population.best(), Some(&individuals[0]));
        assert_eq!(population.fitness_summary().count, 2);
        assert_eq!(population.weight_summaries().len(), 2);
    }

    #[test]
    fn test_inject_replaces_last() {
        let mut population = evaluated(&[2.0, 1.0]);
        let weights = vec![1.0; ALL_BOARD_FEATURES.len()];
        population.inject(Individual::from_weights(weights));
        let last = &population.individuals()[1];
        assert!((last.weights()[0] - 1.0 / ALL_BOARD_FEATURES.len() as f32).abs() < 1e-6);
        assert!((last.fitness() - f32::MIN).abs() < f32::EPSILON);
    }
}
