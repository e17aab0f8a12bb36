//! Settings sections of `config.toml`

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::game::RewardPolicy;

/// Server and storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Local HTTP server port
    /// Default: 8642
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Shared secret required on API requests (sent as `X-Lingvo-Token`)
    ///
    /// If empty, the server accepts unauthenticated requests.
    #[serde(default)]
    pub http_token: String,

    /// SQLite database path. Defaults to `~/.lingvo-time/games.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

fn default_http_port() -> u16 {
    8642
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            http_token: String::new(),
            db_path: None,
        }
    }
}

/// Exercise generation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSettings {
    /// Directory with `level1.txt` .. `level9.txt` word lists.
    /// Tiers without a file fall back to the built-in lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_list_dir: Option<PathBuf>,

    /// Fixed RNG seed (for reproducible sessions). Random when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Which reward formula to apply for a correct answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardFormula {
    /// Seconds spent on the exercise times complexity
    #[default]
    Elapsed,
    /// A fixed amount of seconds times complexity
    Flat,
}

/// Reward settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardSettings {
    #[serde(default)]
    pub policy: RewardFormula,

    /// Seconds per unit of complexity for the `flat` formula
    #[serde(default = "default_flat_seconds")]
    pub flat_seconds: f64,
}

fn default_flat_seconds() -> f64 {
    60.0
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            policy: RewardFormula::default(),
            flat_seconds: default_flat_seconds(),
        }
    }
}

impl RewardSettings {
    pub fn to_policy(&self) -> RewardPolicy {
        match self.policy {
            RewardFormula::Elapsed => RewardPolicy::Elapsed,
            RewardFormula::Flat => RewardPolicy::Flat {
                seconds: self.flat_seconds,
            },
        }
    }
}

/// Reward illustration settings (image URLs shown next to the verdict)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IllustrationSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Image search endpoint, queried as `GET {endpoint}?q=<mark>&limit=<n>`
    /// and expected to answer with a JSON array of URLs
    #[serde(default)]
    pub endpoint: String,

    #[serde(default = "default_illustration_limit")]
    pub limit: usize,

    #[serde(default = "default_illustration_timeout")]
    pub timeout_secs: u64,
}

fn default_illustration_limit() -> usize {
    5
}

fn default_illustration_timeout() -> u64 {
    3
}

impl Default for IllustrationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            limit: default_illustration_limit(),
            timeout_secs: default_illustration_timeout(),
        }
    }
}
