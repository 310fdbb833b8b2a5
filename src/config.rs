//! Game configuration.
//!
//! Defaults live here as constants; [`GameConfig`] gathers everything a
//! session needs and can be loaded from a JSON file.

use crate::generation::GenerationConfig;
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default map width in tiles
pub const DEFAULT_MAP_WIDTH: u32 = 80;

/// Default map height in tiles
pub const DEFAULT_MAP_HEIGHT: u32 = 43;

/// Largest accepted map side in tiles
pub const MAX_MAP_DIMENSION: u32 = 1024;

/// Default sight radius of the player
pub const DEFAULT_FOV_RADIUS: u32 = 8;

/// Messages kept in the log before the oldest are dropped
pub const DEFAULT_MESSAGE_LOG_CAPACITY: usize = 100;

/// Stat increments applied for every level gained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpBonus {
    pub hp: i32,
    pub power: i32,
    pub defense: i32,
}

impl Default for LevelUpBonus {
    fn default() -> Self {
        Self {
            hp: 10,
            power: 1,
            defense: 1,
        }
    }
}

/// Everything configurable about a game session.
///
/// # Examples
///
/// ```
/// use delve::GameConfig;
///
/// let config = GameConfig::new(7);
/// assert_eq!(config.generation.seed, 7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub generation: GenerationConfig,
    pub fov_radius: u32,
    pub message_log_capacity: usize,
    #[serde(default)]
    pub level_up: LevelUpBonus,
}

impl GameConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            generation: GenerationConfig::new(seed),
            fov_radius: DEFAULT_FOV_RADIUS,
            message_log_capacity: DEFAULT_MESSAGE_LOG_CAPACITY,
            level_up: LevelUpBonus::default(),
        }
    }

    /// Smaller maps for fast tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            generation: GenerationConfig::for_testing(seed),
            ..Self::new(seed)
        }
    }

    pub fn validate(&self) -> DelveResult<()> {
        self.generation.validate()?;
        if self.message_log_capacity == 0 {
            return Err(DelveError::InvalidConfig(
                "message_log_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> DelveResult<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> DelveResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.generation.map_width, DEFAULT_MAP_WIDTH);
        assert_eq!(config.generation.map_height, DEFAULT_MAP_HEIGHT);
        assert_eq!(config.fov_radius, DEFAULT_FOV_RADIUS);
        assert_eq!(config.level_up, LevelUpBonus::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig::for_testing(99);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GameConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_level_up_defaults_when_missing() {
        let mut value = serde_json::to_value(GameConfig::new(5)).unwrap();
        value.as_object_mut().unwrap().remove("level_up");
        let config = GameConfig::from_json(&value.to_string()).unwrap();
        assert_eq!(config.level_up, LevelUpBonus::default());
    }

    #[test]
    fn test_rejects_invalid() {
        let mut config = GameConfig::new(1);
        config.message_log_capacity = 0;
        assert!(matches!(config.validate(), Err(DelveError::InvalidConfig(_))));

        let mut config = GameConfig::new(1);
        config.generation.room_min_size = 12;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, serde_json::to_string(&GameConfig::new(3)).unwrap()).unwrap();
        assert_eq!(GameConfig::from_json_file(&path).unwrap().generation.seed, 3);
        assert!(GameConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
