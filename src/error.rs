//! Error type shared by the game engine and its storage layer

/// Errors surfaced by run and exercise operations
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Missing or empty word list, or an invalid difficulty tier
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Exercise kind mismatch, or an answer for an already answered exercise
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unparseable submission or invalid input value
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GameError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        GameError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Short machine-readable code used in API responses
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Configuration(_) => "configuration",
            GameError::NotFound { .. } => "not_found",
            GameError::Conflict(_) => "conflict",
            GameError::Validation(_) => "invalid_input",
            GameError::Storage(_) => "storage",
            GameError::Serialization(_) => "serialization",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GameError::NotFound { .. } => 404,
            GameError::Conflict(_) => 409,
            GameError::Validation(_) => 400,
            GameError::Configuration(_) | GameError::Storage(_) | GameError::Serialization(_) => {
                500
            }
        }
    }
}

pub type GameResult<T> = std::result::Result<T, GameError>;
