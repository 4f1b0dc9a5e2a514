//! World port - the physics collaborator the tick loops drive.
//!
//! The loops only need bounding boxes and a way to actuate the player; how
//! entities move, spawn and despawn is up to the implementation.

use crate::types::{Action, Entity, EntityId, Rect};

/// Physics/world collaborator.
///
/// # Tick Sequence
///
/// Each tick the loops call, in order:
/// 1. the read-only box queries, to observe a state
/// 2. `apply_action` then `fire`
/// 3. the box queries again plus `despawn` / `remove_player` while
///    resolving collisions
/// 4. `advance`, unless the episode just ended
pub trait World {
    /// Player bounding box, `None` once the player was removed.
    fn player(&self) -> Option<Rect>;

    fn enemies(&self) -> Vec<Entity>;

    fn enemy_bullets(&self) -> Vec<Entity>;

    fn player_bullets(&self) -> Vec<Entity>;

    /// Move the player according to `action`.
    fn apply_action(&mut self, action: Action);

    /// Fire a player bullet if the weapon is off cooldown.
    fn fire(&mut self);

    /// Remove an enemy or bullet. Unknown ids are ignored.
    fn despawn(&mut self, id: EntityId);

    fn remove_player(&mut self);

    /// Step every entity other than the player.
    fn advance(&mut self);

    /// Start over with a fresh player and no enemies or bullets.
    fn reset(&mut self);
}

/// Bounding boxes only, in world iteration order.
pub fn rects(entities: &[Entity]) -> Vec<Rect> {
    entities.iter().map(|entity| entity.rect).collect()
}
