//! Observer port - presentation and data collection for the tick loops
//!
//! Observers consume score, reward and episode information. Nothing they
//! return feeds back into learning except errors, which abort the loop.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    q_learning::State,
    types::{Action, Rect},
};

/// Who blew up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casualty {
    Player,
    Enemy,
}

/// An explosion effect requested by the reward evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub casualty: Casualty,
    pub at: Rect,
}

/// Everything that happened in one decision-reward-update cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub episode: usize,
    pub step: usize,
    pub state: State,
    pub action: Action,
    pub reward: f64,
    pub next_state: State,
    pub kills: usize,
    pub score: u32,
    pub epsilon: f64,
    pub terminated: bool,
}

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEnd {
    /// The step budget ran out
    MaxSteps,
    /// The player was shot down
    Died,
    /// A quit signal ended the session
    Quit,
}

/// Totals for one finished episode (or one life in a live session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub total_episodes: Option<usize>,
    pub steps: usize,
    pub total_reward: f64,
    pub score: u32,
    pub kills: usize,
    pub epsilon: f64,
    pub q_table_states: usize,
    pub end: EpisodeEnd,
}

/// Observer trait for monitoring the tick loops
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - once (training only)
/// 2. For each episode or life:
///    - `on_episode_start(episode)`
///    - `on_tick(...)` and `on_explosion(...)` as they happen
///    - `on_game_over(score)` when a live game ends
///    - `on_episode_end(summary)`
/// 3. `on_training_end()` - once
///
/// # Examples
///
/// ```no_run
/// use planewar::ports::{EpisodeSummary, Observer};
///
/// struct BestScore(u32);
///
/// impl Observer for BestScore {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> planewar::Result<()> {
///         self.0 = self.0.max(summary.score);
///         Ok(())
///     }
/// }
/// ```
pub trait Observer {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after the update of every tick.
    fn on_tick(&mut self, _report: &TickReport) -> Result<()> {
        Ok(())
    }

    fn on_explosion(&mut self, _explosion: &Explosion) -> Result<()> {
        Ok(())
    }

    /// Called in live sessions when the player's game ends.
    fn on_game_over(&mut self, _score: u32) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
