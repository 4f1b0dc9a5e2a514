//! Ports (trait boundaries) for external collaborators.
//!
//! The learning core owns these traits; storage, physics, presentation and
//! input are adapters plugged in from outside.

pub mod controls;
pub mod observer;
pub mod repository;
pub mod world;

pub use controls::{ControlEvent, ControlSource};
pub use observer::{Casualty, EpisodeEnd, EpisodeSummary, Explosion, Observer, TickReport};
pub use repository::QTableRepository;
pub use world::World;
