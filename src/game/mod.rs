//! Game engine: level tiers, exercise generation, answer checking, rewards
//! and the run controller tying them together.

pub mod checker;
pub mod controller;
pub mod generator;
pub mod level;
pub mod random;
pub mod reward;

pub use controller::{AnswerResult, AnsweredExercise, ExerciseView, RunController, RunPhase, RunSummary, StartedRun};
pub use level::{Level, arithmetic_tier, level, levels, word_tier};
pub use random::{PcgSource, RandomSource, ScriptedSource};
pub use reward::{RewardPolicy, apply_reward, compute_reward};
