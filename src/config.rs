use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::piece::Color;

/// Consecutive moves without a capture after which the game is a tie.
pub const DEFAULT_NO_CAPTURE_LIMIT: u32 = 30;

/// Rules a game is started with. Any field missing from a config file takes
/// its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side that makes the first move.
    pub first_turn: Color,
    pub no_capture_limit: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            first_turn: Color::Light,
            no_capture_limit: DEFAULT_NO_CAPTURE_LIMIT,
        }
    }
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.no_capture_limit == 0 {
            return Err(ConfigError::Invalid(
                "no_capture_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
