//! SQLite database connection and schema management
//!
//! Manages the `~/.lingvo-time/games.db` database and its schema.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Database wrapper shared by the run store
#[derive(Clone)]
pub struct GameDb {
    conn: Arc<Mutex<Connection>>,
}

impl GameDb {
    /// Open or create the games database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create games dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open games db: {}", path.display()))?;

        // WAL lets a CLI `status` read while the server writes
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::init(conn)
    }

    /// Private in-memory database (tests, throwaway sessions)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory games db")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Lock the connection for one operation
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA_SQL)?;
        debug!("[lingvo:db] Schema ready (version {})", SCHEMA_VERSION);
        Ok(())
    }
}

/// SQL schema for the games database
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS games_schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO games_schema_version VALUES (1);

-- One row per run; never deleted
CREATE TABLE IF NOT EXISTS runs (
    id TEXT PRIMARY KEY,
    complexity REAL NOT NULL,
    game_type TEXT NOT NULL,                -- word, arithmetic
    play_time_seconds REAL NOT NULL DEFAULT 0,
    started_at INTEGER NOT NULL,            -- unix millis
    last_updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_runs_started ON runs(started_at);

-- One row per generated exercise; outcome moves from pending exactly once
CREATE TABLE IF NOT EXISTS exercises (
    id TEXT PRIMARY KEY,
    run_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    payload_json TEXT NOT NULL,
    outcome TEXT NOT NULL DEFAULT 'pending', -- pending, correct, incorrect
    submitted_answer TEXT,
    created_at INTEGER NOT NULL,
    answered_at INTEGER,
    reward_seconds REAL,                     -- set when answered correctly

    FOREIGN KEY (run_id) REFERENCES runs(id)
);
CREATE INDEX IF NOT EXISTS idx_exercises_run ON exercises(run_id);
CREATE INDEX IF NOT EXISTS idx_exercises_outcome ON exercises(outcome);
"#;
