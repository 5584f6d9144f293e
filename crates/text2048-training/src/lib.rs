//! Training of the move evaluator's feature weights.
//!
//! Weights are evolved with a genetic algorithm:
//!
//! 1. **Population** - individuals with random, L1-normalized feature weights
//! 2. **Evaluation** - every individual drives a greedy policy through the same
//!    set of freshly seeded episodes (in parallel, one thread per individual)
//! 3. **Selection** - elites are kept, parents are picked by tournament
//! 4. **Reproduction** - BLX-α crossover, Gaussian mutation, normalization
//! 5. **Repeat** - the [`EvolutionPhase`](config::EvolutionPhase) schedule
//!    narrows the weight range and mutation strength over time
//!
//! ```text
//! Trainer
//!     ↓ evolves
//! Feature Weights (individuals)
//!     ↓ used by
//! Greedy Policy (text2048-agent)
//!     ↓ scored by
//! Episode Evaluator (fitness function)
//! ```
//!
//! [`Trainer::run`](trainer::Trainer::run) hands a
//! [`GenerationReport`](trainer::GenerationReport) to a
//! [`TrainingObserver`](trainer::TrainingObserver) after every generation; the
//! command line uses it to append [`training_log`] records and write
//! checkpoints.

pub mod config;
pub mod genetic;
pub mod trainer;
pub mod training_log;
pub mod weights;
