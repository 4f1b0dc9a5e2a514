//! Reward shaping for one tick of play
//!
//! [`evaluate`] reads the world after the agent's action was applied,
//! resolves hits and deaths (despawning what was destroyed) and returns the
//! shaped reward. Terms are evaluated in a fixed order:
//!
//! 1. **Bullet proximity** - nearest enemy bullet inside the safe distance on
//!    both axes is penalised, otherwise rewarded (only when bullets exist).
//! 2. **Kills** - a one-off bonus when anything was hit this tick plus a
//!    per-kill reward; score grows per kill.
//! 3. **Enemy proximity** - nearest surviving enemy vertically inside the safe
//!    distance is rewarded, otherwise penalised (only when enemies exist).
//! 4. **Death** - the player inside the vertical safe zone and struck by an
//!    enemy bullet dies. [`DeathRule`] decides how the penalty combines.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::session::Session;
use crate::{
    Error, Result,
    ports::{Casualty, Explosion, World, world::rects},
    q_learning::state::nearest_by_vertical,
    types::{EntityId, Rect},
};

/// How the death penalty combines with the other terms of the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathRule {
    /// The tick reward is exactly the death penalty
    Terminal,
    /// The death penalty is added to the terms already accumulated
    Additive,
}

/// Reward-shaping table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardRules {
    pub safe_distance: f64,
    pub bullet_danger: f64,
    pub bullet_clear: f64,
    pub hit_bonus: f64,
    pub kill_reward: f64,
    pub score_per_kill: u32,
    pub enemy_near: f64,
    pub enemy_far: f64,
    pub death_penalty: f64,
    pub death_rule: DeathRule,
    /// Player and enemy bodies colliding destroys both.
    pub ram_collision: bool,
    /// The player can only be shot while `top > safe_zone_top` and
    /// `bottom < safe_zone_bottom`.
    pub safe_zone_top: f64,
    pub safe_zone_bottom: f64,
}

impl RewardRules {
    /// Shaping used while training.
    pub fn training() -> Self {
        Self {
            safe_distance: 40.0,
            bullet_danger: -10.0,
            bullet_clear: 2.0,
            hit_bonus: 50.0,
            kill_reward: 5.0,
            score_per_kill: 10,
            enemy_near: 1.0,
            enemy_far: -0.5,
            death_penalty: -100.0,
            death_rule: DeathRule::Terminal,
            ram_collision: false,
            safe_zone_top: 5.0,
            safe_zone_bottom: 695.0,
        }
    }

    /// Shaping used in live sessions: stronger enemy-proximity terms, an
    /// additive death penalty and deadly rams.
    pub fn live() -> Self {
        Self {
            enemy_near: 2.0,
            enemy_far: -1.0,
            death_rule: DeathRule::Additive,
            ram_collision: true,
            ..Self::training()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            ("safe_distance", self.safe_distance),
            ("bullet_danger", self.bullet_danger),
            ("bullet_clear", self.bullet_clear),
            ("hit_bonus", self.hit_bonus),
            ("kill_reward", self.kill_reward),
            ("enemy_near", self.enemy_near),
            ("enemy_far", self.enemy_far),
            ("death_penalty", self.death_penalty),
            ("safe_zone_top", self.safe_zone_top),
            ("safe_zone_bottom", self.safe_zone_bottom),
        ];
        if let Some((name, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(Error::InvalidConfiguration {
                message: format!("reward rule {name} must be finite, got {value}"),
            });
        }
        if self.safe_distance <= 0.0 {
            return Err(Error::InvalidConfiguration {
                message: format!("safe_distance must be positive, got {}", self.safe_distance),
            });
        }
        if self.safe_zone_top >= self.safe_zone_bottom {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "safe zone [{}, {}] is empty",
                    self.safe_zone_top, self.safe_zone_bottom
                ),
            });
        }
        Ok(())
    }

    fn in_safe_zone(&self, player: &Rect) -> bool {
        player.top > self.safe_zone_top && player.bottom() < self.safe_zone_bottom
    }
}

impl Default for RewardRules {
    fn default() -> Self {
        Self::training()
    }
}

/// Result of evaluating one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub reward: f64,
    pub kills: usize,
    /// The player died this tick.
    pub terminated: bool,
    pub explosions: Vec<Explosion>,
    /// Player box used for the evaluation; still valid after the player was
    /// removed.
    pub player: Rect,
}

/// Evaluate the reward terms for the current tick and apply their side
/// effects to `world` and `session`.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] when the world has no player.
pub fn evaluate<W>(world: &mut W, rules: &RewardRules, session: &mut Session) -> Result<TickOutcome>
where
    W: World + ?Sized,
{
    let player = world.player().ok_or_else(|| Error::InvariantViolation {
        message: "reward evaluated without a player in the world".to_string(),
    })?;

    let mut outcome = TickOutcome {
        reward: 0.0,
        kills: 0,
        terminated: false,
        explosions: Vec::new(),
        player,
    };

    if rules.ram_collision {
        resolve_ram(world, &player, &mut outcome);
    }

    let bullets = rects(&world.enemy_bullets());
    if let Some(nearest) = nearest_by_vertical(&player, &bullets) {
        let dx = (player.left - nearest.left).abs();
        let dy = (player.top - nearest.top).abs();
        outcome.reward += if dx < rules.safe_distance && dy < rules.safe_distance {
            rules.bullet_danger
        } else {
            rules.bullet_clear
        };
    }

    let kills = resolve_hits(world, &mut outcome);
    if kills > 0 {
        outcome.kills = kills;
        outcome.reward += rules.hit_bonus + rules.kill_reward * kills as f64;
        session.add_score(rules.score_per_kill.saturating_mul(kills as u32));
    }

    let enemies = rects(&world.enemies());
    if let Some(nearest) = nearest_by_vertical(&player, &enemies) {
        outcome.reward += if (player.top - nearest.top).abs() < rules.safe_distance {
            rules.enemy_near
        } else {
            rules.enemy_far
        };
    }

    if !outcome.terminated && rules.in_safe_zone(&player) {
        let striking: Vec<EntityId> = world
            .enemy_bullets()
            .iter()
            .filter(|bullet| bullet.rect.intersects(&player))
            .map(|bullet| bullet.id)
            .collect();
        if !striking.is_empty() {
            for id in striking {
                world.despawn(id);
            }
            world.remove_player();
            outcome.explosions.push(Explosion {
                casualty: Casualty::Player,
                at: player,
            });
            outcome.terminated = true;
            outcome.reward = match rules.death_rule {
                DeathRule::Terminal => rules.death_penalty,
                DeathRule::Additive => outcome.reward + rules.death_penalty,
            };
        }
    }

    trace!(
        reward = outcome.reward,
        kills = outcome.kills,
        terminated = outcome.terminated,
        "tick evaluated"
    );
    Ok(outcome)
}

/// Remove every enemy struck by a player bullet, along with the bullets that
/// struck it. An enemy hit by several bullets counts once.
fn resolve_hits<W>(world: &mut W, outcome: &mut TickOutcome) -> usize
where
    W: World + ?Sized,
{
    let bullets = world.player_bullets();
    let mut spent: BTreeSet<EntityId> = BTreeSet::new();
    let mut kills = 0;

    for enemy in world.enemies() {
        let mut hit = false;
        for bullet in bullets.iter().filter(|b| b.rect.intersects(&enemy.rect)) {
            spent.insert(bullet.id);
            hit = true;
        }
        if hit {
            kills += 1;
            world.despawn(enemy.id);
            outcome.explosions.push(Explosion {
                casualty: Casualty::Enemy,
                at: enemy.rect,
            });
        }
    }
    for id in spent {
        world.despawn(id);
    }
    kills
}

fn resolve_ram<W>(world: &mut W, player: &Rect, outcome: &mut TickOutcome)
where
    W: World + ?Sized,
{
    let rammed: Vec<_> = world
        .enemies()
        .into_iter()
        .filter(|enemy| enemy.rect.intersects(player))
        .collect();
    if rammed.is_empty() {
        return;
    }
    world.remove_player();
    outcome.explosions.push(Explosion {
        casualty: Casualty::Player,
        at: *player,
    });
    for enemy in rammed {
        world.despawn(enemy.id);
        outcome.explosions.push(Explosion {
            casualty: Casualty::Enemy,
            at: enemy.rect,
        });
    }
    outcome.terminated = true;
}
