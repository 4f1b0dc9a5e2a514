//! Arena sprites and their per-tick motion.

use super::config::ArenaConfig;
use crate::types::{Action, Entity, EntityId, Rect};

/// Horizontal heading of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct PlayerPlane {
    pub rect: Rect,
    /// Ticks until the weapon is ready again
    pub cooldown: u32,
}

impl PlayerPlane {
    pub fn spawn(config: &ArenaConfig) -> Self {
        Self {
            rect: Rect::new(
                config.player_start_left,
                config.player_start_top,
                config.player_width,
                config.player_height,
            ),
            cooldown: 0,
        }
    }

    /// Move according to `action`, then clamp to the arena.
    ///
    /// `threat` is the nearest enemy bullet, used by [`Action::Avoid`].
    pub fn steer(&mut self, action: Action, threat: Option<&Rect>, config: &ArenaConfig) {
        let speed = config.player_speed;
        match action {
            Action::Up => self.rect.translate(0.0, -speed),
            Action::Down => self.rect.translate(0.0, speed),
            Action::Left => self.rect.translate(-speed, 0.0),
            Action::Right => self.rect.translate(speed, 0.0),
            Action::Avoid => {
                if let Some(bullet) = threat {
                    let dx = if self.rect.left < bullet.left { -speed } else { speed };
                    let dy = if self.rect.top < bullet.top { -speed } else { speed };
                    self.rect.translate(dx, dy);
                }
            }
        }
        self.rect.clamp_within(config.width, config.height);
    }

    /// Bullet leaving the muzzle, if the weapon is ready.
    pub fn try_fire(&mut self, config: &ArenaConfig) -> Option<Rect> {
        if self.cooldown > 0 {
            return None;
        }
        self.cooldown = config.fire_cooldown;
        Some(Rect::new(
            self.rect.left + config.player_bullet_offset,
            self.rect.top - config.player_bullet_height,
            config.player_bullet_width,
            config.player_bullet_height,
        ))
    }

    pub fn cool_down(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }
}

#[derive(Debug, Clone)]
pub struct EnemyPlane {
    pub id: EntityId,
    pub rect: Rect,
    pub heading: Heading,
    /// Ticks until the next shot
    pub reload: u32,
}

impl EnemyPlane {
    pub fn spawn(id: EntityId, left: f64, config: &ArenaConfig) -> Self {
        Self {
            id,
            rect: Rect::new(left, 0.0, config.enemy_width, config.enemy_height),
            heading: Heading::Right,
            reload: 0,
        }
    }

    /// Zig-zag between the side walls while sinking.
    pub fn fly(&mut self, config: &ArenaConfig) {
        match self.heading {
            Heading::Right => self.rect.left += config.enemy_speed_x,
            Heading::Left => self.rect.left -= config.enemy_speed_x,
        }
        let max_left = config.width - self.rect.width;
        if self.rect.left < 0.0 {
            self.rect.left = 0.0;
            self.heading = Heading::Right;
        } else if self.rect.left > max_left {
            self.rect.left = max_left;
            self.heading = Heading::Left;
        }
        self.rect.top += config.enemy_speed_y;
    }

    /// Bullet fired this tick, if reloaded.
    pub fn try_fire(&mut self, config: &ArenaConfig) -> Option<Rect> {
        if self.reload > 0 {
            self.reload -= 1;
            return None;
        }
        self.reload = config.enemy_fire_interval - 1;
        Some(Rect::new(
            self.rect.left + config.enemy_bullet_offset_x,
            self.rect.top + config.enemy_bullet_offset_y,
            config.enemy_bullet_width,
            config.enemy_bullet_height,
        ))
    }

    pub fn is_below(&self, config: &ArenaConfig) -> bool {
        self.rect.top > config.height
    }

    pub fn entity(&self) -> Entity {
        Entity::new(self.id, self.rect)
    }
}

/// A bullet moving vertically at constant speed.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub rect: Rect,
    /// Signed vertical speed, negative moves up
    pub velocity: f64,
}

impl Projectile {
    pub fn new(id: EntityId, rect: Rect, velocity: f64) -> Self {
        Self { id, rect, velocity }
    }

    pub fn fly(&mut self) {
        self.rect.top += self.velocity;
    }

    pub fn entity(&self) -> Entity {
        Entity::new(self.id, self.rect)
    }
}
