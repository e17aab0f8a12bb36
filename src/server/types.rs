//! Request and response types for the HTTP API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::GameType;
use crate::error::{GameError, GameResult};
use crate::game::level::{MAX_TIER, MIN_TIER, level};
use crate::game::RunController;

/// Shared state for request handlers
#[derive(Clone)]
pub struct ApiState {
    pub controller: Arc<RunController>,
    /// Shared secret expected in `X-Lingvo-Token`; `None` disables auth
    pub auth_token: Option<String>,
}

/// POST /runs
///
/// Either `complexity` or `level` (1..=9) picks the difficulty.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRunRequest {
    pub complexity: Option<f64>,
    pub level: Option<u8>,
    pub game_type: String,
}

impl CreateRunRequest {
    pub fn resolve(&self) -> GameResult<(f64, GameType)> {
        let game_type = GameType::from_str(&self.game_type).ok_or_else(|| {
            GameError::Validation(format!("unknown game type '{}'", self.game_type))
        })?;

        let complexity = match (self.complexity, self.level) {
            (Some(_), Some(_)) => {
                return Err(GameError::Validation(
                    "give either complexity or level, not both".to_string(),
                ));
            }
            (Some(c), None) => c,
            (None, Some(n)) if (MIN_TIER..=MAX_TIER).contains(&n) => level(n).complexity,
            (None, Some(n)) => {
                return Err(GameError::Validation(format!(
                    "level must be between {} and {}, got {}",
                    MIN_TIER, MAX_TIER, n
                )));
            }
            (None, None) => {
                return Err(GameError::Validation(
                    "complexity or level is required".to_string(),
                ));
            }
        };

        Ok((complexity, game_type))
    }
}

/// POST /runs/{id}/exercises/{eid}/answer
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    pub submission: String,
}

/// Error body: `{"error": code, "details": msg}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, error: &'static str) -> Self {
        Self {
            status,
            error,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new(400, "bad_request").with_details(details)
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self::new(err.status_code(), err.code()).with_details(err.to_string())
    }
}
