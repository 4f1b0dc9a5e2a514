//! Per-session game context: phase, score and episode counters.
//!
//! Each loop owns one [`Session`]; nothing here is global.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Where a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Created, no tick run yet
    Idle,
    /// Ticks are running
    Running,
    /// The player died; waiting for restart or quit
    GameOver,
    /// A restart was requested; the world is being reset
    Restarting,
}

/// Score and lifecycle state of one game session.
#[derive(Debug, Clone)]
pub struct Session {
    phase: SessionPhase,
    score: u32,
    best_score: u32,
    episode: usize,
    tick: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            score: 0,
            best_score: 0,
            episode: 0,
            tick: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Zero-based index of the current episode (or life).
    pub fn episode(&self) -> usize {
        self.episode
    }

    /// Ticks run since the session started, across restarts.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.best_score = self.best_score.max(self.score);
    }

    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// `Idle -> Running`
    pub fn start(&mut self) -> Result<()> {
        self.transition(SessionPhase::Idle, SessionPhase::Running)
    }

    /// `Running -> GameOver`
    pub fn end_game(&mut self) -> Result<()> {
        self.transition(SessionPhase::Running, SessionPhase::GameOver)
    }

    /// `GameOver -> Restarting`
    pub fn request_restart(&mut self) -> Result<()> {
        self.transition(SessionPhase::GameOver, SessionPhase::Restarting)
    }

    /// `Restarting -> Running`, opening a new episode with a zero score.
    pub fn resume(&mut self) -> Result<()> {
        self.transition(SessionPhase::Restarting, SessionPhase::Running)?;
        self.score = 0;
        self.episode += 1;
        Ok(())
    }

    /// Start the next training episode from any phase.
    pub fn begin_episode(&mut self, episode: usize) {
        self.phase = SessionPhase::Running;
        self.score = 0;
        self.episode = episode;
    }

    fn transition(&mut self, from: SessionPhase, to: SessionPhase) -> Result<()> {
        if self.phase != from {
            return Err(Error::InvariantViolation {
                message: format!(
                    "session cannot move to {to:?} from {:?} (expected {from:?})",
                    self.phase
                ),
            });
        }
        debug!(?from, ?to, episode = self.episode, "session phase change");
        self.phase = to;
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
