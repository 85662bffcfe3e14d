//! Game configuration.
//!
//! Every value has a default taken from [`crate::constants`]; an optional
//! `astro-assault.toml` in the working directory overrides any subset of them.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::constants::*;
use crate::errors::{GameError, GameResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub gameplay: GameplayConfig,
    pub input: InputConfig,
    pub assets: AssetPaths,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            title: WINDOW_TITLE.to_string(),
            fps: FRAMES_PER_SECOND,
        }
    }
}

/// What happens to score, spawn interval and entities when a new round is
/// started from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPolicy {
    /// Every MENU -> GAME transition starts a fresh round.
    #[default]
    Reset,
    /// Returning to the menu pauses the round; starting again resumes it.
    Persist,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    pub player_speed: f64,
    pub laser_speed: f64,
    pub laser_width: u32,
    pub laser_height: u32,
    pub asteroid_min_speed: u32,
    pub asteroid_max_speed: u32,
    pub shoot_delay_ms: u64,
    pub spawn_interval_ms: u64,
    pub spawn_interval_floor_ms: u64,
    pub spawn_interval_step_ms: u64,
    pub score_per_step: u32,
    pub session_policy: SessionPolicy,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            player_speed: PLAYER_SPEED,
            laser_speed: LASER_SPEED,
            laser_width: LASER_WIDTH,
            laser_height: LASER_HEIGHT,
            asteroid_min_speed: ASTEROID_MIN_SPEED,
            asteroid_max_speed: ASTEROID_MAX_SPEED,
            shoot_delay_ms: SHOOT_DELAY_MS,
            spawn_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            spawn_interval_floor_ms: MIN_SPAWN_INTERVAL_MS,
            spawn_interval_step_ms: SPAWN_INTERVAL_STEP_MS,
            score_per_step: SCORE_PER_DIFFICULTY_STEP,
            session_policy: SessionPolicy::Reset,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub held_key_grace_ms: u64,
    pub first_repeat_delay_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            held_key_grace_ms: HELD_KEY_GRACE_MS,
            first_repeat_delay_ms: FIRST_REPEAT_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub player: PathBuf,
    pub asteroid: PathBuf,
    pub menu_background: PathBuf,
    pub game_background: PathBuf,
    pub menu_music: PathBuf,
    pub laser_sound: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            player: PLAYER_SPRITE_PATH.into(),
            asteroid: ASTEROID_SPRITE_PATH.into(),
            menu_background: MENU_BACKGROUND_PATH.into(),
            game_background: GAME_BACKGROUND_PATH.into(),
            menu_music: MENU_MUSIC_PATH.into(),
            laser_sound: LASER_SOUND_PATH.into(),
        }
    }
}

impl GameConfig {
    /// Reads `path` if it exists, otherwise falls back to the defaults.
    pub fn load(path: &Path) -> GameResult<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults.", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("Loaded config from {}.", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn validate(&self) -> GameResult<()> {
        let gameplay = &self.gameplay;
        if self.window.width == 0 || self.window.height == 0 {
            return Err(GameError::InvalidConfig("window size must be non-zero".into()));
        }
        if self.window.fps == 0 {
            return Err(GameError::InvalidConfig("fps must be non-zero".into()));
        }
        if gameplay.spawn_interval_floor_ms == 0 {
            return Err(GameError::InvalidConfig(
                "spawn_interval_floor_ms must be at least 1".into(),
            ));
        }
        if gameplay.asteroid_min_speed > gameplay.asteroid_max_speed {
            return Err(GameError::InvalidConfig(format!(
                "asteroid speed range {}..={} is empty",
                gameplay.asteroid_min_speed, gameplay.asteroid_max_speed
            )));
        }
        if gameplay.score_per_step == 0 {
            return Err(GameError::InvalidConfig("score_per_step must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = GameConfig::parse("").unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "Game Start Menu");
        assert_eq!(config.gameplay.shoot_delay_ms, 250);
        assert_eq!(config.gameplay.session_policy, SessionPolicy::Reset);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = GameConfig::parse(
            r#"
            [gameplay]
            session_policy = "persist"
            shoot_delay_ms = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.gameplay.session_policy, SessionPolicy::Persist);
        assert_eq!(config.gameplay.shoot_delay_ms, 100);
        assert_eq!(config.gameplay.spawn_interval_ms, 1000);
        assert_eq!(config.assets.player, PathBuf::from(PLAYER_SPRITE_PATH));
    }

    #[test]
    fn rejects_inverted_speed_range() {
        let config = GameConfig::parse(
            r#"
            [gameplay]
            asteroid_min_speed = 12
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    fn assert_rejected(toml: &str) {
        let config = GameConfig::parse(toml).unwrap();
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_width() {
        assert_rejected("[window]\nwidth = 0");
    }

    #[test]
    fn rejects_zero_height() {
        assert_rejected("[window]\nheight = 0");
    }

    #[test]
    fn rejects_zero_fps() {
        assert_rejected("[window]\nfps = 0");
    }

    #[test]
    fn rejects_zero_spawn_floor() {
        assert_rejected("[gameplay]\nspawn_interval_floor_ms = 0");
    }

    #[test]
    fn rejects_zero_score_step() {
        assert_rejected("[gameplay]\nscore_per_step = 0");
    }

    #[test]
    fn repeat_timing_is_configurable() {
        let config = GameConfig::parse("[input]\nfirst_repeat_delay_ms = 400").unwrap();
        assert_eq!(config.input.first_repeat_delay_ms, 400);
        assert_eq!(config.input.held_key_grace_ms, 150);
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        assert!(GameConfig::parse("[gameplay]\nsession_policy = \"sometimes\"").is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let config = GameConfig::load(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(config.window.fps, 60);
    }
}
