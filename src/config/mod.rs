//! Configuration loading and management

mod io;
mod settings;

pub use io::write_atomic;

pub use settings::{
    GameSettings, IllustrationSettings, RewardFormula, RewardSettings, Settings,
};

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server and storage settings
    #[serde(default)]
    pub settings: Settings,

    /// Exercise generation
    #[serde(default)]
    pub game: GameSettings,

    /// Reward formula
    #[serde(default)]
    pub reward: RewardSettings,

    /// Reward illustrations
    #[serde(default)]
    pub illustrations: IllustrationSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.settings.http_port, 8642);
        assert!(config.settings.http_token.is_empty());
        assert_eq!(config.reward.policy, RewardFormula::Elapsed);
        assert_eq!(config.reward.flat_seconds, 60.0);
        assert!(!config.illustrations.enabled);
        assert_eq!(config.illustrations.limit, 5);
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [settings]
            http_port = 9000

            [game]
            seed = 7

            [reward]
            policy = "flat"
            flat_seconds = 30.0
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.http_port, 9000);
        assert_eq!(config.game.seed, Some(7));
        assert_eq!(
            config.reward.to_policy(),
            crate::game::RewardPolicy::Flat { seconds: 30.0 }
        );
    }
}
