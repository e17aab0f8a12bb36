//! Persistence of runs and exercises
//!
//! [`RunStore`] is the seam between the game engine and storage.
//! [`SqliteRunStore`] keeps everything in the `games.db` SQLite file.
//!
//! # Usage
//!
//! ```ignore
//! let db = GameDb::open(&config.db_path())?;
//! let store = SqliteRunStore::new(db, Arc::new(SystemClock));
//!
//! let run_id = store.create_run(1.5, GameType::Word)?;
//! let exercise_id = store.create_exercise(run_id, GameType::Word, &payload)?;
//! ```

mod db;
mod sqlite;

pub use db::GameDb;
pub use sqlite::SqliteRunStore;

use chrono::{DateTime, Utc};

use crate::domain::{Exercise, ExerciseId, GameType, Outcome, Payload, Run, RunId};
use crate::error::GameResult;

/// Storage operations needed by the run controller.
///
/// Lookups fail with `NotFound` for unknown ids.
pub trait RunStore: Send + Sync {
    /// Create a run with zero play time
    fn create_run(&self, complexity: f64, game_type: GameType) -> GameResult<RunId>;

    fn get_run(&self, id: RunId) -> GameResult<Run>;

    /// Most recently started runs first
    fn list_runs(&self, limit: usize) -> GameResult<Vec<Run>>;

    /// Store a new pending exercise. `Conflict` if `kind` (or the payload's
    /// kind) differs from the run's game type.
    fn create_exercise(
        &self,
        run_id: RunId,
        kind: GameType,
        payload: &Payload,
    ) -> GameResult<ExerciseId>;

    fn get_exercise(&self, id: ExerciseId) -> GameResult<Exercise>;

    /// Exercises of a run, oldest first
    fn list_exercises(&self, run_id: RunId) -> GameResult<Vec<Exercise>>;

    /// Move a pending exercise to a terminal outcome. `Conflict` if it is
    /// no longer pending.
    fn record_answer(
        &self,
        exercise_id: ExerciseId,
        submitted_answer: &str,
        outcome: Outcome,
    ) -> GameResult<()>;

    /// Credit `reward_seconds` to a run and stamp `last_updated_at`
    fn update_run_reward(
        &self,
        run_id: RunId,
        reward_seconds: f64,
        now: DateTime<Utc>,
    ) -> GameResult<()>;

    /// `record_answer` and `update_run_reward` as one atomic unit.
    ///
    /// Only the caller that moves the exercise out of `pending` gets to
    /// credit the run; everyone else receives `Conflict` and nothing changes.
    /// Returns the updated run.
    fn settle_answer(
        &self,
        exercise_id: ExerciseId,
        submitted_answer: &str,
        outcome: Outcome,
        reward_seconds: f64,
        now: DateTime<Utc>,
    ) -> GameResult<Run>;
}
