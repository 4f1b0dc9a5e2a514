//! The arena world: entity bookkeeping, spawning and motion.

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::trace;

use super::{
    config::ArenaConfig,
    entities::{EnemyPlane, PlayerPlane, Projectile},
};
use crate::{
    Result,
    ports::World,
    q_learning::state::nearest_by_vertical,
    types::{Action, Entity, EntityId, Rect},
};

/// Headless implementation of [`World`].
///
/// Entity ids are unique for the lifetime of the arena, across resets.
#[derive(Debug, Clone)]
pub struct Arena {
    config: ArenaConfig,
    rng: StdRng,
    player: Option<PlayerPlane>,
    enemies: Vec<EnemyPlane>,
    enemy_bullets: Vec<Projectile>,
    player_bullets: Vec<Projectile>,
    next_id: u64,
    spawn_timer: u32,
    tick: u64,
}

impl Arena {
    /// Create an arena with the player at its start position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration)
    /// when `config` fails [`ArenaConfig::validate`].
    pub fn new(config: ArenaConfig) -> Result<Self> {
        config.validate()?;
        let player = Some(PlayerPlane::spawn(&config));
        Ok(Self {
            config,
            rng: StdRng::from_rng(&mut rand::rng()),
            player,
            enemies: Vec::new(),
            enemy_bullets: Vec::new(),
            player_bullets: Vec::new(),
            next_id: 0,
            spawn_timer: 0,
            tick: 0,
        })
    }

    /// Seed the spawn-column RNG for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Ticks advanced since the last reset.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Place an enemy at the top of the arena with its left edge at `left`.
    pub fn spawn_enemy(&mut self, left: f64) -> EntityId {
        let id = self.allocate_id();
        self.enemies.push(EnemyPlane::spawn(id, left, &self.config));
        trace!(%id, left, "enemy spawned");
        id
    }

    /// Place an enemy bullet with its top-left corner at `(left, top)`.
    pub fn spawn_enemy_bullet(&mut self, left: f64, top: f64) -> EntityId {
        let rect = Rect::new(
            left,
            top,
            self.config.enemy_bullet_width,
            self.config.enemy_bullet_height,
        );
        self.push_enemy_bullet(rect)
    }

    /// Move the player to an absolute position.
    pub fn place_player(&mut self, left: f64, top: f64) {
        if let Some(player) = &mut self.player {
            player.rect.left = left;
            player.rect.top = top;
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_enemy_bullet(&mut self, rect: Rect) -> EntityId {
        let id = self.allocate_id();
        self.enemy_bullets
            .push(Projectile::new(id, rect, self.config.enemy_bullet_speed));
        id
    }

    fn spawn_random_enemy(&mut self) {
        let column = self.rng.random_range(0..self.config.spawn_columns());
        let left = self.config.enemy_spawn_min_left + f64::from(column) * self.config.enemy_spawn_step;
        self.spawn_enemy(left);
    }
}

impl World for Arena {
    fn player(&self) -> Option<Rect> {
        self.player.as_ref().map(|player| player.rect)
    }

    fn enemies(&self) -> Vec<Entity> {
        self.enemies.iter().map(EnemyPlane::entity).collect()
    }

    fn enemy_bullets(&self) -> Vec<Entity> {
        self.enemy_bullets.iter().map(Projectile::entity).collect()
    }

    fn player_bullets(&self) -> Vec<Entity> {
        self.player_bullets.iter().map(Projectile::entity).collect()
    }

    fn apply_action(&mut self, action: Action) {
        let Some(player) = &mut self.player else {
            return;
        };
        let threat = nearest_by_vertical(
            &player.rect,
            self.enemy_bullets.iter().map(|bullet| &bullet.rect),
        );
        player.steer(action, threat, &self.config);
    }

    fn fire(&mut self) {
        let Some(rect) = self
            .player
            .as_mut()
            .and_then(|player| player.try_fire(&self.config))
        else {
            return;
        };
        let id = self.allocate_id();
        self.player_bullets
            .push(Projectile::new(id, rect, -self.config.player_bullet_speed));
    }

    fn despawn(&mut self, id: EntityId) {
        self.enemies.retain(|enemy| enemy.id != id);
        self.enemy_bullets.retain(|bullet| bullet.id != id);
        self.player_bullets.retain(|bullet| bullet.id != id);
    }

    fn remove_player(&mut self) {
        self.player = None;
    }

    fn advance(&mut self) {
        self.tick += 1;

        if let Some(player) = &mut self.player {
            player.cool_down();
        }

        for bullet in &mut self.player_bullets {
            bullet.fly();
        }
        let ceiling = self.config.player_bullet_despawn_top;
        self.player_bullets.retain(|bullet| bullet.rect.top >= ceiling);

        for bullet in &mut self.enemy_bullets {
            bullet.fly();
        }
        let floor = self.config.enemy_bullet_despawn_top;
        self.enemy_bullets.retain(|bullet| bullet.rect.top <= floor);

        let mut shots = Vec::new();
        for enemy in &mut self.enemies {
            enemy.fly(&self.config);
            if let Some(shot) = enemy.try_fire(&self.config) {
                shots.push(shot);
            }
        }
        let config = &self.config;
        self.enemies.retain(|enemy| !enemy.is_below(config));
        for shot in shots {
            self.push_enemy_bullet(shot);
        }

        self.spawn_timer += 1;
        if self.spawn_timer >= self.config.enemy_spawn_interval {
            self.spawn_timer = 0;
            self.spawn_random_enemy();
        }
    }

    fn reset(&mut self) {
        self.player = Some(PlayerPlane::spawn(&self.config));
        self.enemies.clear();
        self.enemy_bullets.clear();
        self.player_bullets.clear();
        self.spawn_timer = 0;
        self.tick = 0;
    }
}
