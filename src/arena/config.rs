//! Arena dimensions, speeds and timers.
//!
//! Distances are arena units, durations are ticks.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,

    pub player_width: f64,
    pub player_height: f64,
    pub player_start_left: f64,
    pub player_start_top: f64,
    pub player_speed: f64,
    /// Ticks between two automatic shots
    pub fire_cooldown: u32,

    pub player_bullet_width: f64,
    pub player_bullet_height: f64,
    /// Horizontal muzzle offset from the player's left edge
    pub player_bullet_offset: f64,
    pub player_bullet_speed: f64,
    /// Player bullets above this line are removed
    pub player_bullet_despawn_top: f64,

    pub enemy_width: f64,
    pub enemy_height: f64,
    /// Ticks between two enemy spawns
    pub enemy_spawn_interval: u32,
    /// Spawn columns start here and repeat every `enemy_spawn_step`
    pub enemy_spawn_min_left: f64,
    pub enemy_spawn_step: f64,
    pub enemy_speed_x: f64,
    pub enemy_speed_y: f64,
    /// Ticks between two enemy shots
    pub enemy_fire_interval: u32,

    pub enemy_bullet_width: f64,
    pub enemy_bullet_height: f64,
    pub enemy_bullet_offset_x: f64,
    pub enemy_bullet_offset_y: f64,
    pub enemy_bullet_speed: f64,
    /// Enemy bullets below this line are removed
    pub enemy_bullet_despawn_top: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 700.0,

            player_width: 102.0,
            player_height: 126.0,
            player_start_left: 189.0,
            player_start_top: 550.0,
            player_speed: 5.0,
            fire_cooldown: 10,

            player_bullet_width: 5.0,
            player_bullet_height: 11.0,
            player_bullet_offset: 49.0,
            player_bullet_speed: 5.0,
            player_bullet_despawn_top: -22.0,

            enemy_width: 57.0,
            enemy_height: 43.0,
            enemy_spawn_interval: 100,
            enemy_spawn_min_left: 1.0,
            enemy_spawn_step: 50.0,
            enemy_speed_x: 3.0,
            enemy_speed_y: 2.0,
            enemy_fire_interval: 50,

            enemy_bullet_width: 6.0,
            enemy_bullet_height: 11.0,
            enemy_bullet_offset_x: 25.0,
            enemy_bullet_offset_y: 43.0,
            enemy_bullet_speed: 2.5,
            enemy_bullet_despawn_top: 852.0,
        }
    }
}

impl ArenaConfig {
    /// Number of distinct enemy spawn columns.
    pub fn spawn_columns(&self) -> u32 {
        let span = self.width - self.enemy_spawn_min_left;
        (span / self.enemy_spawn_step).ceil().max(1.0) as u32
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("player_speed", self.player_speed),
            ("enemy_width", self.enemy_width),
            ("enemy_height", self.enemy_height),
            ("enemy_spawn_step", self.enemy_spawn_step),
            ("player_bullet_speed", self.player_bullet_speed),
            ("enemy_bullet_speed", self.enemy_bullet_speed),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfiguration {
                    message: format!("arena {name} must be positive, got {value}"),
                });
            }
        }
        if self.player_width > self.width || self.player_height > self.height {
            return Err(Error::InvalidConfiguration {
                message: "player does not fit inside the arena".to_string(),
            });
        }
        if self.enemy_spawn_min_left < 0.0 || self.enemy_spawn_min_left >= self.width {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "enemy_spawn_min_left {} lies outside the arena",
                    self.enemy_spawn_min_left
                ),
            });
        }
        if self.enemy_spawn_interval == 0 || self.enemy_fire_interval == 0 {
            return Err(Error::InvalidConfiguration {
                message: "enemy spawn and fire intervals must be at least 1 tick".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spawn_columns() {
        // 1, 51, ..., 451
        assert_eq!(ArenaConfig::default().spawn_columns(), 10);
    }

    #[test]
    fn test_validate() {
        assert!(ArenaConfig::default().validate().is_ok());

        let config = ArenaConfig {
            player_width: 600.0,
            ..ArenaConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ArenaConfig {
            enemy_spawn_interval: 0,
            ..ArenaConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
