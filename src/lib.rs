//! Lingvo Time - earn play time by solving puzzles
//!
//! A run is a single play session at a fixed complexity. Each exercise is
//! either a word with one letter withheld or a short addition/subtraction
//! problem. Correct answers credit play time to the run.
//!
//! ## Layout
//!
//! - [`game`]: tiers, exercise generation, answer checking, rewards and the
//!   [`game::RunController`] driving a run
//! - [`store`]: SQLite persistence of runs and exercises
//! - [`server`]: local JSON HTTP API
//! - [`config`]: `config.toml` loading

pub mod app;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod game;
pub mod illustration;
pub mod server;
pub mod store;
pub mod words;

pub use domain::*;
pub use error::{GameError, GameResult};
