//! Move evaluation and policies for playing 2048.
//!
//! The crate mirrors how a move is chosen and how a player is judged:
//!
//! 1. **Move evaluation** ([`move_evaluator`]) scores the board a single move
//!    would produce, as a weighted sum of normalized [`board_feature`]s.
//! 2. **Policies** ([`policy`]) pick a move for the current board: greedily by
//!    evaluator score, or uniformly at random.
//! 3. **Episode evaluation** ([`episode_evaluator`]) plays whole episodes and
//!    turns their statistics into a fitness value for training.
//!
//! ```text
//! Episode Evaluation (fitness for training)
//!     ↓ uses
//! Policy (select a move)
//!     ↓ uses
//! Move Evaluation (score a single move)
//! ```
//!
//! [`evaluation`] runs a policy through the reset/step environment and reports
//! score statistics and the distribution of maximum tiles.
//!
//! # Example
//!
//! ```
//! use text2048_agent::{
//!     board_feature::ALL_BOARD_FEATURES,
//!     move_evaluator::FeatureBasedMoveEvaluator,
//!     policy::{GreedyPolicy, Policy as _},
//! };
//! use text2048_engine::{EngineConfig, GridEngine, TileSeed};
//!
//! let weights = vec![1.0; ALL_BOARD_FEATURES.len()];
//! let evaluator = FeatureBasedMoveEvaluator::new(ALL_BOARD_FEATURES.to_vec(), weights);
//! let mut policy = GreedyPolicy::new(Box::new(evaluator));
//!
//! let engine = GridEngine::new(EngineConfig::default(), TileSeed::from(8)).unwrap();
//! assert!(policy.select_move(engine.board()).is_some());
//! ```

pub mod board_feature;
pub mod episode_evaluator;
pub mod evaluation;
pub mod move_analysis;
pub mod move_evaluator;
pub mod policy;
pub mod summary;
