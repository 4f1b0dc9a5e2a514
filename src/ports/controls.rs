//! Controls port - external quit/restart signals for live sessions.

use crate::pipeline::SessionPhase;

/// Input the live loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// End the session (saving the table first)
    Quit,
    /// Leave the game-over screen and start a new game
    Restart,
}

/// Source of control events, polled once per tick.
pub trait ControlSource {
    fn poll(&mut self, phase: SessionPhase, tick: u64) -> Option<ControlEvent>;
}
