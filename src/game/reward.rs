//! Play-time rewards for correct answers

use chrono::{DateTime, Utc};

use crate::domain::{Exercise, Run};

/// How a correct answer is converted into play time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RewardPolicy {
    /// Seconds spent on the exercise times the run's complexity
    #[default]
    Elapsed,
    /// `seconds` times the run's complexity, regardless of time spent
    Flat { seconds: f64 },
}

impl RewardPolicy {
    pub fn reward(&self, run: &Run, exercise: &Exercise, now: DateTime<Utc>) -> f64 {
        match self {
            RewardPolicy::Elapsed => compute_reward(run, exercise, now),
            RewardPolicy::Flat { seconds } => non_negative(seconds * run.complexity),
        }
    }
}

/// `(now - exercise.created_at) * run.complexity`, never negative
pub fn compute_reward(run: &Run, exercise: &Exercise, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = (now - exercise.created_at).num_milliseconds();
    non_negative(elapsed_ms as f64 / 1000.0 * run.complexity)
}

/// A copy of `run` with `reward` credited at `now`
pub fn apply_reward(run: &Run, reward: f64, now: DateTime<Utc>) -> Run {
    Run {
        play_time_seconds: run.play_time_seconds + non_negative(reward),
        last_updated_at: now,
        ..run.clone()
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
