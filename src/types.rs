//! Shared domain types: bounding boxes, entities and the action vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Axis-aligned bounding box in arena units.
///
/// `top` grows downwards, matching screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Strict overlap test; boxes that merely touch do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && self.right() > other.left
            && self.top < other.bottom()
            && self.bottom() > other.top
    }

    /// Move the box by the given deltas.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.left += dx;
        self.top += dy;
    }

    /// Keep the box inside `[0, width] x [0, height]`.
    pub fn clamp_within(&mut self, width: f64, height: f64) {
        if self.top < 0.0 {
            self.top = 0.0;
        }
        if self.bottom() > height {
            self.top = height - self.height;
        }
        if self.left < 0.0 {
            self.left = 0.0;
        }
        if self.right() > width {
            self.left = width - self.width;
        }
    }
}

/// Stable identifier of an entity inside a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entity as exposed by the world: identity plus bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub rect: Rect,
}

impl Entity {
    pub fn new(id: EntityId, rect: Rect) -> Self {
        Self { id, rect }
    }
}

/// Control commands available to the agent each tick.
///
/// The declaration order is the action index used for greedy tie-breaks and
/// for the persisted value layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Step away from the nearest enemy bullet on both axes.
    Avoid,
}

impl Action {
    pub const COUNT: usize = 5;

    /// Every action, ordered by index.
    pub const ALL: [Action; Action::COUNT] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Avoid,
    ];

    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
            Action::Avoid => 4,
        }
    }

    /// Map an index back to an action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] for indices outside the closed set.
    pub fn from_index(index: usize) -> Result<Self> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or_else(|| Error::InvariantViolation {
                message: format!("action index {index} outside 0..{}", Action::COUNT),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::Avoid => "avoid",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
