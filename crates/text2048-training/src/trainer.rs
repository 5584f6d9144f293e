//! The training loop.
//!
//! Every generation gets freshly seeded starting engines drawn from the
//! trainer's own RNG, so a run is reproducible from [`TrainingConfig::seed`]
//! while individuals are never tuned to one fixed set of spawns.

use std::collections::BTreeMap;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use text2048_agent::{
    board_feature::{ALL_BOARD_FEATURES, BoardFeature},
    episode_evaluator::{DefaultEpisodeEvaluator, EpisodeEvaluator, MaxTileFitness, ScoreFitness},
    evaluation::{self, EvaluationReport},
    move_evaluator::FeatureBasedMoveEvaluator,
    policy::GreedyPolicy,
    summary::Summary,
};
use text2048_engine::{ConfigError as EngineConfigError, GridEngine, TileSeed};
use text2048_env::{EnvConfig, EnvConfigError, EnvError, ObservationEncoding, Text2048Env};

use crate::{
    config::{ConfigError, EvolutionPhase, FitnessKind, TrainingConfig},
    genetic::{Individual, Population, PopulationEvolver},
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From, derive_more::IsVariant)]
pub enum TrainingError {
    #[display("failed to create a training engine")]
    Engine(EngineConfigError),
    #[display("failed to create the evaluation environment")]
    Env(EnvConfigError),
    #[display("periodic evaluation failed")]
    Evaluation(EnvError),
}

/// What happened in one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub generation: usize,
    pub phase: EvolutionPhase,
    /// Fitness across this generation's population.
    pub fitness: Summary,
    /// Best individual seen so far, across all generations.
    pub best: Individual,
    /// Weights of [`Self::best`] keyed by feature id.
    pub best_weights: BTreeMap<String, f32>,
    /// Weight statistics across this generation's population, keyed by
    /// feature id.
    pub weight_summaries: BTreeMap<String, Summary>,
    /// Set on generations where the periodic evaluation ran.
    pub evaluation: Option<EvaluationReport>,
    /// Whether a checkpoint is due after this generation.
    pub checkpoint: bool,
}

/// Receives a report after every generation.
///
/// Returning an error stops training.
pub trait TrainingObserver {
    type Error: From<TrainingError>;

    fn on_generation(&mut self, report: &GenerationReport) -> Result<(), Self::Error>;

    /// Checked before every generation. Returning `true` ends training early
    /// with the best individual found so far.
    fn should_stop(&self) -> bool {
        false
    }
}

/// Ignores every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TrainingObserver for NoopObserver {
    type Error = TrainingError;

    fn on_generation(&mut self, _report: &GenerationReport) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
    features: Vec<&'static dyn BoardFeature>,
}

impl Trainer {
    /// A trainer over [`ALL_BOARD_FEATURES`].
    pub fn new(config: TrainingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            features: ALL_BOARD_FEATURES.to_vec(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    #[must_use]
    pub fn features(&self) -> &[&'static dyn BoardFeature] {
        &self.features
    }

    /// Weights keyed by feature id.
    #[must_use]
    pub fn weight_map(&self, weights: &[f32]) -> BTreeMap<String, f32> {
        FeatureBasedMoveEvaluator::new(self.features.clone(), weights.to_vec()).weight_map()
    }

    /// Runs every configured generation, or until the observer asks to stop,
    /// and returns the best individual.
    ///
    /// `initial_weights` (ordered like [`Self::features`]) resumes from a
    /// previous run: they replace one random individual of the first
    /// generation. If training stops before any generation finishes, the
    /// result is an unevaluated individual: the resumed weights when given.
    ///
    /// # Panics
    ///
    /// Panics if `initial_weights` has a different length than the feature
    /// list.
    pub fn run<O>(
        &self,
        initial_weights: Option<Vec<f32>>,
        observer: &mut O,
    ) -> Result<Individual, O::Error>
    where
        O: TrainingObserver + ?Sized,
    {
        let config = &self.config;
        let mut rng = Pcg32::seed_from_u64(config.seed);

        let initial_params = config.phases.params(config.phases.phase(0));
        let mut population = Population::random(
            self.features.clone(),
            config.population_size,
            &mut rng,
            initial_params.max_weight,
        );
        if let Some(weights) = initial_weights {
            tracing::info!("resuming from initial weights");
            population.inject(Individual::from_weights(weights));
        }
        let mut best = match population.individuals().last() {
            Some(last) => last.clone(),
            None => Individual::from_weights(vec![0.0; self.features.len()]),
        };

        let episode_evaluator: Box<dyn EpisodeEvaluator> = match config.fitness {
            FitnessKind::Score => Box::new(DefaultEpisodeEvaluator::new(
                config.move_limit,
                ScoreFitness::new(),
            )),
            FitnessKind::MaxTile => Box::new(DefaultEpisodeEvaluator::new(
                config.move_limit,
                MaxTileFitness::new(),
            )),
        };

        for generation in 0..config.generations {
            if observer.should_stop() {
                tracing::warn!(generation, "training stopped early");
                break;
            }
            let phase = config.phases.phase(generation);
            let params = config.phases.params(phase);

            let engines = (0..config.episodes_per_individual)
                .map(|_| GridEngine::new(config.engine, rng.random::<TileSeed>()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(TrainingError::from)?;
            population.evaluate_fitness(&engines, &*episode_evaluator);

            if let Some(generation_best) = population.best()
                && generation_best.fitness() > best.fitness()
            {
                best = generation_best.clone();
            }

            let evaluation = if config.is_evaluation(generation) {
                Some(self.evaluate_individual(&best, &mut rng)?)
            } else {
                None
            };

            let report = GenerationReport {
                generation,
                phase,
                fitness: population.fitness_summary(),
                best_weights: self.weight_map(best.weights()),
                best: best.clone(),
                weight_summaries: self.weight_summary_map(&population),
                evaluation,
                checkpoint: config.is_checkpoint(generation),
            };
            tracing::info!(
                generation,
                %phase,
                fitness_max = report.fitness.max,
                fitness_mean = report.fitness.mean,
                fitness_min = report.fitness.min,
                best = best.fitness(),
                "generation finished"
            );
            if let Some(evaluation) = &report.evaluation {
                tracing::info!(
                    generation,
                    mean_score = evaluation.score.mean,
                    "periodic evaluation finished"
                );
            }
            observer.on_generation(&report)?;

            if generation + 1 < config.generations {
                let evolver = PopulationEvolver {
                    elite_count: config.elite_count,
                    max_weight: params.max_weight,
                    tournament_size: config.tournament_size,
                    mutation_sigma: params.mutation_sigma,
                    blx_alpha: config.blx_alpha,
                    mutation_rate: config.mutation_rate,
                };
                population = evolver.evolve(&population, &mut rng);
            }
        }

        Ok(best)
    }

    fn weight_summary_map(&self, population: &Population) -> BTreeMap<String, Summary> {
        self.features
            .iter()
            .map(|f| f.id().to_owned())
            .zip(population.weight_summaries())
            .collect()
    }

    /// Plays `eval_episodes` environment episodes with `individual`'s greedy
    /// policy.
    fn evaluate_individual(
        &self,
        individual: &Individual,
        rng: &mut Pcg32,
    ) -> Result<EvaluationReport, TrainingError> {
        let env_config = EnvConfig {
            engine: self.config.engine,
            encoding: ObservationEncoding::Log2,
            ..EnvConfig::default()
        };
        let mut env = Text2048Env::new(env_config, rng.random::<TileSeed>())?;
        let move_evaluator =
            FeatureBasedMoveEvaluator::new(self.features.clone(), individual.weights().to_vec());
        let mut policy = GreedyPolicy::new(Box::new(move_evaluator));
        let report = evaluation::evaluate(
            &mut policy,
            &mut env,
            self.config.eval_episodes,
            rng.random(),
        )?;
        Ok(report)
    }
}
