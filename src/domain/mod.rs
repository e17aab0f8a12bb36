//! Core domain types for Lingvo Time

mod exercise;
mod run;

pub use exercise::{
    ArithmeticTask, Exercise, ExerciseId, MASK_CHAR, Operator, Outcome, Payload, WordTask,
};
pub use run::{GameType, Run, RunId, format_seconds};
