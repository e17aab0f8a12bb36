use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::run::{GameType, RunId};

/// Placeholder shown in place of the withheld letter
pub const MASK_CHAR: char = '_';

/// Unique identifier for an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub Uuid);

impl ExerciseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for ExerciseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of answering an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Not answered yet
    Pending,
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Correct => "correct",
            Outcome::Incorrect => "incorrect",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Outcome::Pending),
            "correct" => Some(Outcome::Correct),
            "incorrect" => Some(Outcome::Incorrect),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A word with one letter withheld
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTask {
    pub word: String,
    /// Character (not byte) index of the withheld letter
    pub withheld_index: usize,
}

impl WordTask {
    /// The word with the withheld letter replaced by `_`
    pub fn masked(&self) -> String {
        self.word
            .chars()
            .enumerate()
            .map(|(i, c)| if i == self.withheld_index { MASK_CHAR } else { c })
            .collect()
    }

    /// The withheld letter, `None` if the index is out of range
    pub fn answer(&self) -> Option<char> {
        self.word.chars().nth(self.withheld_index)
    }
}

/// Binary operator used in arithmetic exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
        }
    }

    pub fn apply(&self, lhs: i64, rhs: i64) -> i64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
        }
    }
}

/// A left-to-right expression such as `12 + 7 - 4`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArithmeticTask {
    /// Operands in order; always one more than `operators`
    pub terms: Vec<i64>,
    pub operators: Vec<Operator>,
    /// Literal expression shown to the player
    pub expression: String,
    pub expected: i64,
}

impl ArithmeticTask {
    /// Build a task from its first operand and the `(operator, operand)` tail
    pub fn new(first: i64, rest: &[(Operator, i64)]) -> Self {
        let mut terms = Vec::with_capacity(rest.len() + 1);
        let mut operators = Vec::with_capacity(rest.len());
        let mut expression = first.to_string();
        terms.push(first);
        for (op, term) in rest {
            expression.push_str(&format!(" {} {}", op.symbol(), term));
            operators.push(*op);
            terms.push(*term);
        }
        let mut task = Self {
            terms,
            operators,
            expression,
            expected: 0,
        };
        task.expected = task.evaluate();
        task
    }

    /// Evaluate the stored terms and operators left to right
    pub fn evaluate(&self) -> i64 {
        let mut terms = self.terms.iter();
        let first = terms.next().copied().unwrap_or(0);
        self.operators
            .iter()
            .zip(terms)
            .fold(first, |acc, (op, term)| op.apply(acc, *term))
    }
}

/// Kind-specific exercise content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Word(WordTask),
    Arithmetic(ArithmeticTask),
}

impl Payload {
    pub fn kind(&self) -> GameType {
        match self {
            Payload::Word(_) => GameType::Word,
            Payload::Arithmetic(_) => GameType::Arithmetic,
        }
    }

    /// What the player sees: the masked word or the expression
    pub fn prompt(&self) -> String {
        match self {
            Payload::Word(task) => task.masked(),
            Payload::Arithmetic(task) => task.expression.clone(),
        }
    }

    /// The expected answer as text
    pub fn correct_answer(&self) -> String {
        match self {
            Payload::Word(task) => task.answer().map(String::from).unwrap_or_default(),
            Payload::Arithmetic(task) => task.expected.to_string(),
        }
    }
}

/// One generated task belonging to a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub run_id: RunId,
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
    pub submitted_answer: Option<String>,
    pub outcome: Outcome,
    /// Play time credited for this exercise (set once answered)
    pub reward_seconds: Option<f64>,
}

impl Exercise {
    pub fn new(run_id: RunId, payload: Payload, now: DateTime<Utc>) -> Self {
        Self {
            id: ExerciseId::new(),
            run_id,
            payload,
            created_at: now,
            answered_at: None,
            submitted_answer: None,
            outcome: Outcome::Pending,
            reward_seconds: None,
        }
    }

    pub fn kind(&self) -> GameType {
        self.payload.kind()
    }

    pub fn is_pending(&self) -> bool {
        self.outcome == Outcome::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_word() {
        let task = WordTask {
            word: "cat".to_string(),
            withheld_index: 1,
        };
        assert_eq!(task.masked(), "c_t");
        assert_eq!(task.answer(), Some('a'));
    }

    #[test]
    fn test_masked_word_uses_char_positions() {
        let task = WordTask {
            word: "привет".to_string(),
            withheld_index: 2,
        };
        assert_eq!(task.masked(), "пр_вет");
        assert_eq!(task.answer(), Some('и'));
    }

    #[test]
    fn test_arithmetic_task_expression() {
        let task = ArithmeticTask::new(12, &[(Operator::Add, 7), (Operator::Subtract, 4)]);
        assert_eq!(task.expression, "12 + 7 - 4");
        assert_eq!(task.expected, 15);
        assert_eq!(task.terms, vec![12, 7, 4]);
    }

    #[test]
    fn test_payload_serializes_with_kind_tag() {
        let payload = Payload::Word(WordTask {
            word: "dog".to_string(),
            withheld_index: 0,
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "word");
        assert_eq!(json["word"], "dog");
        assert_eq!(payload.kind(), GameType::Word);
        assert_eq!(payload.correct_answer(), "d");
    }

    #[test]
    fn test_outcome_terminal() {
        assert!(!Outcome::Pending.is_terminal());
        assert!(Outcome::Correct.is_terminal());
        assert!(Outcome::Incorrect.is_terminal());
        assert_eq!(Outcome::from_str("incorrect"), Some(Outcome::Incorrect));
        assert_eq!(Outcome::from_str("bogus"), None);
    }
}
