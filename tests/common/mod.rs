//! Shared test utilities for run flow and HTTP API tests
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use lingvo_time::clock::ManualClock;
use lingvo_time::game::{RunController, ScriptedSource};
use lingvo_time::store::{GameDb, SqliteRunStore};
use lingvo_time::words::WordLists;

/// A controller on a temp-file database with a manual clock
pub struct Harness {
    pub controller: Arc<RunController>,
    pub clock: Arc<ManualClock>,
    pub db: GameDb,
    _dir: TempDir,
}

/// Word list used by the tests: tier 1 holds only "cat"
pub fn test_words() -> WordLists {
    WordLists::builtin().with_tier(1, &["cat"])
}

/// Build a harness whose random draws replay `script`
pub fn harness(script: Vec<i64>) -> Harness {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db = GameDb::open(&dir.path().join("games.db")).expect("Failed to open games db");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap(),
    ));
    let store = SqliteRunStore::new(db.clone(), clock.clone());

    let controller = RunController::new(
        Arc::new(store),
        Arc::new(test_words()),
        Box::new(ScriptedSource::new(script)),
        clock.clone(),
    );

    Harness {
        controller: Arc::new(controller),
        clock,
        db,
        _dir: dir,
    }
}

/// Evaluate an `a + b - c` prompt
pub fn evaluate(expression: &str) -> i64 {
    let mut tokens = expression.split_whitespace();
    let mut acc: i64 = tokens.next().unwrap().parse().unwrap();
    while let (Some(op), Some(term)) = (tokens.next(), tokens.next()) {
        let term: i64 = term.parse().unwrap();
        acc = match op {
            "+" => acc + term,
            "-" => acc - term,
            other => panic!("unexpected operator {}", other),
        };
    }
    acc
}
