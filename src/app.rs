//! Wiring from configuration to a ready [`RunController`]

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::game::{PcgSource, RandomSource, RunController};
use crate::illustration;
use crate::store::{GameDb, SqliteRunStore};
use crate::words::WordLists;

/// Open the database at `db_path` and build a controller from `config`
pub fn build_controller(config: &Config, db_path: &Path) -> Result<RunController> {
    let db = GameDb::open(db_path)?;
    info!("[lingvo:app] Using database {}", db_path.display());
    controller_with_db(config, db)
}

/// Build a controller on an already opened database
pub fn controller_with_db(config: &Config, db: GameDb) -> Result<RunController> {
    let clock = Arc::new(SystemClock);
    let store = SqliteRunStore::new(db, clock.clone());

    let words = match &config.game.word_list_dir {
        Some(dir) => WordLists::from_dir(dir)?,
        None => WordLists::builtin(),
    };

    let rng: Box<dyn RandomSource> = match config.game.seed {
        Some(seed) => Box::new(PcgSource::from_seed(seed)),
        None => Box::new(PcgSource::from_entropy()),
    };

    Ok(
        RunController::new(Arc::new(store), Arc::new(words), rng, clock)
            .with_reward_policy(config.reward.to_policy())
            .with_illustrator(illustration::from_settings(&config.illustrations)),
    )
}
