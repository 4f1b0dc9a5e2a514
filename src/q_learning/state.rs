//! Discrete state construction from world positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::discretizer::Discretizer;
use crate::types::Rect;

/// Bucketed distances from the player to the nearest bullet and nearest enemy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct State {
    pub bullet_dx: i64,
    pub bullet_dy: i64,
    pub enemy_dx: i64,
    pub enemy_dy: i64,
}

impl State {
    pub fn new(bullet_dx: i64, bullet_dy: i64, enemy_dx: i64, enemy_dy: i64) -> Self {
        Self {
            bullet_dx,
            bullet_dy,
            enemy_dx,
            enemy_dy,
        }
    }

    pub fn as_tuple(&self) -> (i64, i64, i64, i64) {
        (self.bullet_dx, self.bullet_dy, self.enemy_dx, self.enemy_dy)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{},{})",
            self.bullet_dx, self.bullet_dy, self.enemy_dx, self.enemy_dy
        )
    }
}

/// Pick the box whose top edge is vertically closest to `player`.
///
/// Ties resolve to the earliest box in iteration order.
pub fn nearest_by_vertical<'a, I>(player: &Rect, boxes: I) -> Option<&'a Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut best: Option<(&Rect, f64)> = None;
    for candidate in boxes {
        let distance = (candidate.top - player.top).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best.map(|(rect, _)| rect)
}

/// Builds [`State`] values from player, bullet and enemy boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateBuilder {
    discretizer: Discretizer,
}

impl StateBuilder {
    pub fn new(discretizer: Discretizer) -> Self {
        Self { discretizer }
    }

    pub fn discretizer(&self) -> Discretizer {
        self.discretizer
    }

    pub fn build_state(&self, player: &Rect, bullets: &[Rect], enemies: &[Rect]) -> State {
        let (bullet_dx, bullet_dy) = self.bucketed_offset(player, bullets);
        let (enemy_dx, enemy_dy) = self.bucketed_offset(player, enemies);
        State::new(bullet_dx, bullet_dy, enemy_dx, enemy_dy)
    }

    fn bucketed_offset(&self, player: &Rect, boxes: &[Rect]) -> (i64, i64) {
        match nearest_by_vertical(player, boxes) {
            Some(target) => (
                self.discretizer.bucket(player.left - target.left),
                self.discretizer.bucket(player.top - target.top),
            ),
            None => (0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Rect {
        Rect::new(200.0, 500.0, 102.0, 126.0)
    }

    #[test]
    fn test_empty_world_is_origin_state() {
        let state = StateBuilder::default().build_state(&player(), &[], &[]);
        assert_eq!(state, State::new(0, 0, 0, 0));
    }

    #[test]
    fn test_bucketed_distances() {
        // bullet deltas (25, 34), enemy deltas (7, 58)
        let bullet = Rect::new(225.0, 466.0, 6.0, 11.0);
        let enemy = Rect::new(193.0, 442.0, 57.0, 43.0);

        let state = StateBuilder::default().build_state(&player(), &[bullet], &[enemy]);

        assert_eq!(state.as_tuple(), (2, 3, 0, 5));
    }

    #[test]
    fn test_nearest_selected_by_vertical_distance() {
        let far = Rect::new(200.0, 100.0, 6.0, 11.0);
        let near = Rect::new(400.0, 480.0, 6.0, 11.0);

        let state = StateBuilder::default().build_state(&player(), &[far, near], &[]);

        assert_eq!(state.bullet_dx, 20);
        assert_eq!(state.bullet_dy, 2);
    }

    #[test]
    fn test_vertical_tie_goes_to_first() {
        let first = Rect::new(300.0, 520.0, 6.0, 11.0);
        let second = Rect::new(210.0, 480.0, 6.0, 11.0);

        let picked = nearest_by_vertical(&player(), [&first, &second]).unwrap();
        assert_eq!(picked, &first);

        let picked = nearest_by_vertical(&player(), [&second, &first]).unwrap();
        assert_eq!(picked, &second);
    }

    #[test]
    fn test_custom_step() {
        let builder = StateBuilder::new(Discretizer::new(5.0).unwrap());
        let enemy = Rect::new(212.0, 500.0, 57.0, 43.0);
        let state = builder.build_state(&player(), &[], &[enemy]);
        assert_eq!(state.as_tuple(), (0, 0, 2, 0));
    }
}
