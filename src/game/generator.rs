//! Exercise generation for both game types

use tracing::debug;

use super::level::{MIN_ARITHMETIC_TIER, arithmetic_tier, word_tier};
use super::random::RandomSource;
use crate::domain::{ArithmeticTask, GameType, Operator, Payload, WordTask};
use crate::error::{GameError, GameResult};
use crate::words::WordSource;

/// Smallest operand drawn for arithmetic exercises
const MIN_OPERAND: i64 = 2;

/// Generate the payload of a new exercise for `game_type`
pub fn generate_payload(
    game_type: GameType,
    complexity: f64,
    words: &dyn WordSource,
    rng: &mut dyn RandomSource,
) -> GameResult<Payload> {
    match game_type {
        GameType::Word => generate_word_exercise(complexity, words, rng).map(Payload::Word),
        GameType::Arithmetic => generate_arithmetic_exercise(complexity, rng).map(Payload::Arithmetic),
    }
}

/// Pick a word from the tier matching `complexity` and withhold one letter
pub fn generate_word_exercise(
    complexity: f64,
    words: &dyn WordSource,
    rng: &mut dyn RandomSource,
) -> GameResult<WordTask> {
    let tier = word_tier(complexity);
    let candidates = match words.words(tier) {
        Some(list) if !list.is_empty() => list,
        Some(_) => {
            return Err(GameError::Configuration(format!(
                "word list for tier {} is empty",
                tier
            )));
        }
        None => {
            return Err(GameError::Configuration(format!(
                "no word list for tier {}",
                tier
            )));
        }
    };

    let word = &candidates[rng.index(candidates.len())];
    let len = word.chars().count();
    if len == 0 {
        return Err(GameError::Configuration(format!(
            "word list for tier {} contains an empty word",
            tier
        )));
    }

    let withheld_index = rng.index(len);
    debug!(
        "[lingvo:gen] word exercise tier={} len={} withheld={}",
        tier, len, withheld_index
    );
    Ok(WordTask {
        word: word.clone(),
        withheld_index,
    })
}

/// Build an addition/subtraction problem for the tier matching `complexity`
pub fn generate_arithmetic_exercise(
    complexity: f64,
    rng: &mut dyn RandomSource,
) -> GameResult<ArithmeticTask> {
    generate_arithmetic_for_tier(arithmetic_tier(complexity), rng)
}

/// Build an addition/subtraction problem for an explicit tier.
///
/// Operands are drawn from `[2, 10 * tier)`. Subtraction never goes negative.
/// Tiers 3 and 4 get a third term.
pub fn generate_arithmetic_for_tier(
    tier: u32,
    rng: &mut dyn RandomSource,
) -> GameResult<ArithmeticTask> {
    if tier < MIN_ARITHMETIC_TIER {
        return Err(GameError::Configuration(format!(
            "arithmetic tier must be at least {}, got {}",
            MIN_ARITHMETIC_TIER, tier
        )));
    }

    let upper = 10 * i64::from(tier);
    let mut first = rng.draw(MIN_OPERAND, upper);
    let mut second = rng.draw(MIN_OPERAND, upper);
    let op = if rng.flip() {
        Operator::Subtract
    } else {
        Operator::Add
    };
    if op == Operator::Subtract && first < second {
        std::mem::swap(&mut first, &mut second);
    }

    let mut rest = vec![(op, second)];
    if (3..5).contains(&tier) {
        let running = op.apply(first, second);
        match op {
            Operator::Add => rest.push((Operator::Add, rng.draw(MIN_OPERAND, upper))),
            // [1, 0] is empty, so a zero result stays a two-term expression
            Operator::Subtract if running >= 1 => {
                rest.push((Operator::Subtract, rng.draw(1, running + 1)))
            }
            Operator::Subtract => {}
        }
    }

    let task = ArithmeticTask::new(first, &rest);
    debug!(
        "[lingvo:gen] arithmetic exercise tier={} expression={:?}",
        tier, task.expression
    );
    Ok(task)
}
