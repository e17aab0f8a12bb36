//! SQLite implementation of [`RunStore`]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;
use uuid::Uuid;

use super::RunStore;
use super::db::GameDb;
use crate::clock::Clock;
use crate::domain::{Exercise, ExerciseId, GameType, Outcome, Payload, Run, RunId};
use crate::error::{GameError, GameResult};

const RUN_COLUMNS: &str =
    "id, complexity, game_type, play_time_seconds, started_at, last_updated_at";

const EXERCISE_COLUMNS: &str = "id, run_id, payload_json, outcome, submitted_answer, \
     reward_seconds, created_at, answered_at";

/// Run store backed by [`GameDb`]
#[derive(Clone)]
pub struct SqliteRunStore {
    db: GameDb,
    clock: Arc<dyn Clock>,
}

impl SqliteRunStore {
    pub fn new(db: GameDb, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

impl RunStore for SqliteRunStore {
    fn create_run(&self, complexity: f64, game_type: GameType) -> GameResult<RunId> {
        let run = Run::new(complexity, game_type, self.clock.now());
        let conn = self.db.conn();
        conn.execute(
            r#"INSERT INTO runs (id, complexity, game_type, play_time_seconds, started_at, last_updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                run.id.to_string(),
                run.complexity,
                run.game_type.as_str(),
                run.play_time_seconds,
                run.started_at.timestamp_millis(),
                run.last_updated_at.timestamp_millis(),
            ],
        )?;
        debug!("[lingvo:db] Created run {}", run.id);
        Ok(run.id)
    }

    fn get_run(&self, id: RunId) -> GameResult<Run> {
        let conn = self.db.conn();
        fetch_run(&conn, id)
    }

    fn list_runs(&self, limit: usize) -> GameResult<Vec<Run>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RUN_COLUMNS} FROM runs ORDER BY started_at DESC, rowid DESC LIMIT ?1"
        ))?;
        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(runs)
    }

    fn create_exercise(
        &self,
        run_id: RunId,
        kind: GameType,
        payload: &Payload,
    ) -> GameResult<ExerciseId> {
        let conn = self.db.conn();
        let run = fetch_run(&conn, run_id)?;
        if kind != run.game_type {
            return Err(GameError::Conflict(format!(
                "run {} plays {}, cannot add a {} exercise",
                run_id, run.game_type, kind
            )));
        }
        if payload.kind() != kind {
            return Err(GameError::Conflict(format!(
                "{} payload does not match exercise kind {}",
                payload.kind(),
                kind
            )));
        }

        let exercise = Exercise::new(run_id, payload.clone(), self.clock.now());
        conn.execute(
            r#"INSERT INTO exercises (id, run_id, kind, payload_json, outcome, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                exercise.id.to_string(),
                run_id.to_string(),
                kind.as_str(),
                serde_json::to_string(&exercise.payload)?,
                Outcome::Pending.as_str(),
                exercise.created_at.timestamp_millis(),
            ],
        )?;
        debug!("[lingvo:db] Created {} exercise {} for run {}", kind, exercise.id, run_id);
        Ok(exercise.id)
    }

    fn get_exercise(&self, id: ExerciseId) -> GameResult<Exercise> {
        let conn = self.db.conn();
        fetch_exercise(&conn, id)
    }

    fn list_exercises(&self, run_id: RunId) -> GameResult<Vec<Exercise>> {
        let conn = self.db.conn();
        fetch_run(&conn, run_id)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE run_id = ?1 ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
            .query_map(params![run_id.to_string()], ExerciseRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ExerciseRow::into_exercise).collect()
    }

    fn record_answer(
        &self,
        exercise_id: ExerciseId,
        submitted_answer: &str,
        outcome: Outcome,
    ) -> GameResult<()> {
        let now = self.clock.now();
        let conn = self.db.conn();
        mark_answered(&conn, exercise_id, submitted_answer, outcome, None, now)
    }

    fn update_run_reward(
        &self,
        run_id: RunId,
        reward_seconds: f64,
        now: DateTime<Utc>,
    ) -> GameResult<()> {
        let conn = self.db.conn();
        credit_run(&conn, run_id, reward_seconds, now)
    }

    fn settle_answer(
        &self,
        exercise_id: ExerciseId,
        submitted_answer: &str,
        outcome: Outcome,
        reward_seconds: f64,
        now: DateTime<Utc>,
    ) -> GameResult<Run> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let run_id = fetch_exercise(&tx, exercise_id)?.run_id;
        mark_answered(
            &tx,
            exercise_id,
            submitted_answer,
            outcome,
            Some(reward_seconds),
            now,
        )?;
        credit_run(&tx, run_id, reward_seconds, now)?;
        let run = fetch_run(&tx, run_id)?;

        tx.commit()?;
        debug!(
            "[lingvo:db] Settled exercise {} as {} (+{:.1}s)",
            exercise_id, outcome, reward_seconds
        );
        Ok(run)
    }
}

/// Conditional terminal write: only a pending exercise is updated
fn mark_answered(
    conn: &Connection,
    exercise_id: ExerciseId,
    submitted_answer: &str,
    outcome: Outcome,
    reward_seconds: Option<f64>,
    now: DateTime<Utc>,
) -> GameResult<()> {
    if !outcome.is_terminal() {
        return Err(GameError::Validation(
            "an answer must be recorded as correct or incorrect".to_string(),
        ));
    }

    let changed = conn.execute(
        r#"UPDATE exercises SET
               outcome = ?2,
               submitted_answer = ?3,
               reward_seconds = ?4,
               answered_at = MAX(?5, created_at)
           WHERE id = ?1 AND outcome = 'pending'"#,
        params![
            exercise_id.to_string(),
            outcome.as_str(),
            submitted_answer,
            reward_seconds,
            now.timestamp_millis(),
        ],
    )?;

    if changed == 0 {
        // Either unknown, or somebody answered first
        let existing = fetch_exercise(conn, exercise_id)?;
        return Err(GameError::Conflict(format!(
            "exercise {} was already answered ({})",
            exercise_id, existing.outcome
        )));
    }
    Ok(())
}

fn credit_run(
    conn: &Connection,
    run_id: RunId,
    reward_seconds: f64,
    now: DateTime<Utc>,
) -> GameResult<()> {
    let reward = if reward_seconds.is_finite() && reward_seconds > 0.0 {
        reward_seconds
    } else {
        0.0
    };
    let changed = conn.execute(
        r#"UPDATE runs SET
               play_time_seconds = play_time_seconds + ?2,
               last_updated_at = MAX(last_updated_at, ?3)
           WHERE id = ?1"#,
        params![run_id.to_string(), reward, now.timestamp_millis()],
    )?;
    if changed == 0 {
        return Err(GameError::not_found("run", run_id));
    }
    Ok(())
}

fn fetch_run(conn: &Connection, id: RunId) -> GameResult<Run> {
    conn.query_row(
        &format!("SELECT {RUN_COLUMNS} FROM runs WHERE id = ?1"),
        params![id.to_string()],
        run_from_row,
    )
    .optional()?
    .ok_or_else(|| GameError::not_found("run", id))
}

fn fetch_exercise(conn: &Connection, id: ExerciseId) -> GameResult<Exercise> {
    conn.query_row(
        &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1"),
        params![id.to_string()],
        ExerciseRow::from_row,
    )
    .optional()?
    .ok_or_else(|| GameError::not_found("exercise", id))?
    .into_exercise()
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<Run> {
    let game_type: String = row.get(2)?;
    Ok(Run {
        id: RunId(uuid_column(row, 0)?),
        complexity: row.get(1)?,
        game_type: GameType::from_str(&game_type).ok_or_else(|| bad_text(2, "game_type"))?,
        play_time_seconds: row.get(3)?,
        started_at: from_millis(row.get(4)?),
        last_updated_at: from_millis(row.get(5)?),
    })
}

/// Raw exercise row; the payload JSON is decoded outside the row callback
struct ExerciseRow {
    id: ExerciseId,
    run_id: RunId,
    payload_json: String,
    outcome: Outcome,
    submitted_answer: Option<String>,
    reward_seconds: Option<f64>,
    created_at: i64,
    answered_at: Option<i64>,
}

impl ExerciseRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let outcome: String = row.get(3)?;
        Ok(Self {
            id: ExerciseId(uuid_column(row, 0)?),
            run_id: RunId(uuid_column(row, 1)?),
            payload_json: row.get(2)?,
            outcome: Outcome::from_str(&outcome).ok_or_else(|| bad_text(3, "outcome"))?,
            submitted_answer: row.get(4)?,
            reward_seconds: row.get(5)?,
            created_at: row.get(6)?,
            answered_at: row.get(7)?,
        })
    }

    fn into_exercise(self) -> GameResult<Exercise> {
        let payload: Payload = serde_json::from_str(&self.payload_json)?;
        Ok(Exercise {
            id: self.id,
            run_id: self.run_id,
            payload,
            created_at: from_millis(self.created_at),
            answered_at: self.answered_at.map(from_millis),
            submitted_answer: self.submitted_answer,
            outcome: self.outcome,
            reward_seconds: self.reward_seconds,
        })
    }
}

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn bad_text(idx: usize, column: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, column.to_string(), Type::Text)
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
