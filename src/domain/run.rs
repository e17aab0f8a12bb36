use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of puzzles a run serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    /// Fill in the missing letter of a word
    Word,
    /// Solve a short addition/subtraction expression
    Arithmetic,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Word => "word",
            GameType::Arithmetic => "arithmetic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "word" | "lingvo" | "lingvo_task" => Some(GameType::Word),
            "arithmetic" | "math" | "math_task" => Some(GameType::Arithmetic),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One player's continuous play session
///
/// `complexity` and `game_type` are fixed at creation. `play_time_seconds`
/// only grows, and only through rewards for correct answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub started_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub complexity: f64,
    pub game_type: GameType,
    pub play_time_seconds: f64,
}

impl Run {
    pub fn new(complexity: f64, game_type: GameType, now: DateTime<Utc>) -> Self {
        Self {
            id: RunId::new(),
            started_at: now,
            last_updated_at: now,
            complexity,
            game_type,
            play_time_seconds: 0.0,
        }
    }

    /// Credited play time formatted as `HH:MM:SS`
    pub fn play_time_display(&self) -> String {
        format_seconds(self.play_time_seconds)
    }
}

/// Format a number of seconds as `HH:MM:SS` (fractions are truncated)
pub fn format_seconds(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_type_parsing_accepts_legacy_names() {
        assert_eq!(GameType::from_str("word"), Some(GameType::Word));
        assert_eq!(GameType::from_str("lingvo"), Some(GameType::Word));
        assert_eq!(GameType::from_str("Math"), Some(GameType::Arithmetic));
        assert_eq!(GameType::from_str("math_task"), Some(GameType::Arithmetic));
        assert_eq!(GameType::from_str("chess"), None);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00");
        assert_eq!(format_seconds(59.9), "00:00:59");
        assert_eq!(format_seconds(3725.0), "01:02:05");
        assert_eq!(format_seconds(-4.0), "00:00:00");
        assert_eq!(format_seconds(f64::NAN), "00:00:00");
    }

    #[test]
    fn test_run_id_parse() {
        let id = RunId::new();
        assert_eq!(RunId::parse(&id.to_string()), Some(id));
        assert_eq!(RunId::parse("not-a-uuid"), None);
    }
}
