//! Answer validation

use crate::domain::{ArithmeticTask, Payload, WordTask};
use crate::error::{GameError, GameResult};

/// True iff `submitted` is exactly the withheld letter (case-sensitive)
pub fn check_word_answer(task: &WordTask, submitted: &str) -> bool {
    let mut chars = submitted.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => task.answer() == Some(letter),
        _ => false,
    }
}

/// True iff `submitted` parses to the expected integer.
///
/// Surrounding whitespace is ignored; anything else that is not an integer
/// is a [`GameError::Validation`].
pub fn check_arithmetic_answer(task: &ArithmeticTask, submitted: &str) -> GameResult<bool> {
    let value: i64 = submitted.trim().parse().map_err(|_| {
        GameError::Validation(format!("'{}' is not a whole number", submitted.trim()))
    })?;
    Ok(value == task.expected)
}

/// Check a submission against any payload
pub fn check_answer(payload: &Payload, submitted: &str) -> GameResult<bool> {
    match payload {
        Payload::Word(task) => Ok(check_word_answer(task, submitted)),
        Payload::Arithmetic(task) => check_arithmetic_answer(task, submitted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Operator;

    fn cat() -> WordTask {
        WordTask {
            word: "cat".to_string(),
            withheld_index: 1,
        }
    }

    #[test]
    fn test_word_answer_exact_match() {
        assert!(check_word_answer(&cat(), "a"));
    }

    #[test]
    fn test_word_answer_is_case_sensitive() {
        assert!(!check_word_answer(&cat(), "A"));
    }

    #[test]
    fn test_word_answer_rejects_other_letters() {
        for c in ('b'..='z').chain('0'..='9') {
            assert!(!check_word_answer(&cat(), &c.to_string()), "accepted {c}");
        }
    }

    #[test]
    fn test_word_answer_requires_single_char() {
        assert!(!check_word_answer(&cat(), ""));
        assert!(!check_word_answer(&cat(), "aa"));
        assert!(!check_word_answer(&cat(), " a"));
    }

    #[test]
    fn test_word_answer_unicode() {
        let task = WordTask {
            word: "ёжик".to_string(),
            withheld_index: 0,
        };
        assert!(check_word_answer(&task, "ё"));
        assert!(!check_word_answer(&task, "е"));
    }

    #[test]
    fn test_arithmetic_answer() {
        let task = ArithmeticTask::new(5, &[(Operator::Subtract, 3)]);
        assert!(check_arithmetic_answer(&task, "2").unwrap());
        assert!(check_arithmetic_answer(&task, " 2\n").unwrap());
        assert!(!check_arithmetic_answer(&task, "3").unwrap());
        assert!(!check_arithmetic_answer(&task, "-2").unwrap());
    }

    #[test]
    fn test_arithmetic_answer_unparseable() {
        let task = ArithmeticTask::new(5, &[(Operator::Add, 3)]);
        for bad in ["", "eight", "8.0", "8 apples"] {
            let err = check_arithmetic_answer(&task, bad).unwrap_err();
            assert!(matches!(err, GameError::Validation(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_check_answer_dispatch() {
        let word = Payload::Word(cat());
        assert!(check_answer(&word, "a").unwrap());
        let math = Payload::Arithmetic(ArithmeticTask::new(2, &[(Operator::Add, 2)]));
        assert!(check_answer(&math, "4").unwrap());
        assert!(check_answer(&math, "four").is_err());
    }
}
