//! Headless arena: the physics the agent plays in
//!
//! Player, enemies and two bullet groups live on a 480x700 playfield.
//! Enemies spawn at the top on a timer, zig-zag downwards and shoot; the
//! player fires automatically whenever its weapon is off cooldown. All
//! collision tests are bounding-box overlaps.

pub mod config;
pub mod entities;
pub mod simulation;

pub use config::ArenaConfig;
pub use simulation::Arena;
