//! Difficulty levels and tiers
//!
//! Players pick a level; level `N` carries complexity `N * 0.75`. The
//! continuous complexity maps back to a discrete word-list tier.

use serde::Serialize;

/// Complexity carried by one level step
pub const COMPLEXITY_STEP: f64 = 0.75;

/// Lowest and highest word-list tier
pub const MIN_TIER: u8 = 1;
pub const MAX_TIER: u8 = 9;

/// Smallest tier the arithmetic generator accepts
pub const MIN_ARITHMETIC_TIER: u32 = 2;

/// A selectable difficulty level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub level: u8,
    pub complexity: f64,
    pub label: String,
}

/// All selectable levels, easiest first
pub fn levels() -> Vec<Level> {
    (MIN_TIER..=MAX_TIER).map(level).collect()
}

/// Level `n` with its complexity and label
pub fn level(n: u8) -> Level {
    Level {
        level: n,
        complexity: f64::from(n) * COMPLEXITY_STEP,
        label: format!("Level {}", n),
    }
}

/// Word-list tier for a complexity: `round(complexity / 0.75)` clamped to 1..=9
pub fn word_tier(complexity: f64) -> u8 {
    let raw = (complexity / COMPLEXITY_STEP).round();
    if !raw.is_finite() || raw < f64::from(MIN_TIER) {
        // NaN and -inf land here too
        return if raw == f64::INFINITY { MAX_TIER } else { MIN_TIER };
    }
    if raw > f64::from(MAX_TIER) {
        return MAX_TIER;
    }
    raw as u8
}

/// Arithmetic tier for a complexity: one above the word tier, so level 1
/// already has a non-trivial operand range
pub fn arithmetic_tier(complexity: f64) -> u32 {
    u32::from(word_tier(complexity)) + 1
}
