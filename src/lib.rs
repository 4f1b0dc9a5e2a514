//! Planewar: an arcade shooter played by a tabular Q-learning agent
//!
//! This crate provides:
//! - A headless arena with the player plane, zig-zagging enemies and bullets
//! - State discretization, an epsilon-greedy policy and the Q-learning update
//! - Reward shaping, the episodic training loop and the live session loop
//! - Q-table persistence (MessagePack) and CSV export
//! - A CLI to train, play, inspect and export

pub mod adapters;
pub mod app;
pub mod arena;
pub mod cli;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use error::{Error, Result};
pub use types::{Action, Rect};
