//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives in [`Tuning`]. The
//! defaults are the shipped balance; a JSON file can override any subset.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{OBSTACLE_TRAVEL_FRACTION, SCORE_INTERVAL};

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    /// File is not valid tuning JSON
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
    /// Values parsed but make no sense together
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fixed playfield size in pixels (y grows upward)
    pub screen_size: Vec2,
    /// World gravity (pixels/s²)
    pub gravity: Vec2,
    /// Ground scroll period in seconds
    pub duration: f32,
    /// Seconds between obstacle spawn rolls
    pub cactus_spawn_duration: f32,
    /// Horizontal spacing between obstacles in a cluster
    pub cluster_offset: f32,
    /// Upward impulse applied on jump
    pub jump_impulse: Vec2,
    /// Height of the ground strip
    pub ground_height: f32,
    /// Ground surface friction
    pub ground_friction: f32,
    /// Character bounding box
    pub character_size: Vec2,
    /// Character horizontal position as a fraction of screen width
    pub character_x: f32,
    /// Character mass (impulse / mass = velocity change)
    pub character_mass: f32,
    /// Character surface friction
    pub character_friction: f32,
    /// Obstacle bounding box
    pub obstacle_size: Vec2,
    /// Seconds of running time per score point
    pub score_interval: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_size: Vec2::new(800.0, 300.0),
            gravity: Vec2::new(0.0, -2000.0),
            duration: 10.0,
            cactus_spawn_duration: 1.5,
            cluster_offset: 30.0,
            jump_impulse: Vec2::new(0.0, 700.0),
            ground_height: 40.0,
            ground_friction: 0.6,
            character_size: Vec2::new(40.0, 44.0),
            character_x: 0.2,
            character_mass: 1.0,
            character_friction: 0.2,
            obstacle_size: Vec2::new(24.0, 48.0),
            score_interval: SCORE_INTERVAL,
        }
    }
}

impl Tuning {
    /// Top edge of the ground strip
    #[inline]
    pub fn ground_top(&self) -> f32 {
        self.ground_height
    }

    /// Seconds an obstacle needs to cross the screen at speed 1.0
    #[inline]
    pub fn obstacle_lifetime(&self) -> f32 {
        self.duration * OBSTACLE_TRAVEL_FRACTION
    }

    /// Distance an obstacle travels from fully off the right edge to fully off the left
    #[inline]
    pub fn obstacle_travel_distance(&self) -> f32 {
        self.screen_size.x + self.obstacle_size.x
    }

    /// Distance the ground moves per period, matched to obstacle pace
    pub fn ground_loop_distance(&self) -> f32 {
        self.obstacle_travel_distance() / OBSTACLE_TRAVEL_FRACTION
    }

    /// Ground strip size: wide enough to cover the screen at any loop phase
    pub fn ground_size(&self) -> Vec2 {
        Vec2::new(
            self.screen_size.x + self.ground_loop_distance(),
            self.ground_height,
        )
    }

    /// Where the character stands when a session starts
    pub fn character_spawn(&self) -> Vec2 {
        Vec2::new(
            self.screen_size.x * self.character_x,
            self.ground_top() + self.character_size.y / 2.0,
        )
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("screen width", self.screen_size.x),
            ("screen height", self.screen_size.y),
            ("duration", self.duration),
            ("cactus_spawn_duration", self.cactus_spawn_duration),
            ("ground_height", self.ground_height),
            ("character_mass", self.character_mass),
            ("score_interval", self.score_interval),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be > 0, got {value}")));
            }
        }
        if self.character_size.min_element() <= 0.0 || self.obstacle_size.min_element() <= 0.0 {
            return Err(ConfigError::Invalid("entity sizes must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.character_x) {
            return Err(ConfigError::Invalid(format!(
                "character_x must be within 0..=1, got {}",
                self.character_x
            )));
        }
        Ok(())
    }

    /// Load tuning from a JSON file (missing fields fall back to defaults)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let tuning: Tuning = serde_json::from_str(&json)?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Write tuning as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_obstacle_lifetime_is_fraction_of_duration() {
        let tuning = Tuning {
            duration: 4.0,
            ..Default::default()
        };
        assert!((tuning.obstacle_lifetime() - 0.76).abs() < 1e-5);
    }

    #[test]
    fn test_ground_pace_matches_obstacles() {
        let tuning = Tuning::default();
        let obstacle_pace = tuning.obstacle_travel_distance() / tuning.obstacle_lifetime();
        let ground_pace = tuning.ground_loop_distance() / tuning.duration;
        assert!((obstacle_pace - ground_pace).abs() < 1e-2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{ "duration": 6.0 }"#).unwrap();
        assert_eq!(tuning.duration, 6.0);
        assert_eq!(tuning.cluster_offset, Tuning::default().cluster_offset);
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let tuning = Tuning {
            duration: 0.0,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_roundtrip_through_file() {
        let path = std::env::temp_dir().join(format!("cactus-dash-tuning-{}.json", std::process::id()));
        let tuning = Tuning {
            cactus_spawn_duration: 2.5,
            ..Default::default()
        };
        tuning.save(&path).unwrap();
        let loaded = Tuning::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, tuning);
    }
}
