//! Control sources for sessions without a human at the keyboard.

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use tracing::{info, warn};

use crate::{
    Error, Result,
    pipeline::SessionPhase,
    ports::{ControlEvent, ControlSource},
};

/// Unattended play: restarts after a game over a limited number of times and
/// optionally quits after a tick budget.
#[derive(Debug, Clone)]
pub struct HeadlessControls {
    quit_after: Option<u64>,
    restarts_remaining: u32,
}

impl HeadlessControls {
    pub fn new(quit_after: Option<u64>, restarts: u32) -> Self {
        Self {
            quit_after,
            restarts_remaining: restarts,
        }
    }

    pub fn restarts_remaining(&self) -> u32 {
        self.restarts_remaining
    }
}

impl ControlSource for HeadlessControls {
    fn poll(&mut self, phase: SessionPhase, tick: u64) -> Option<ControlEvent> {
        if self.quit_after.is_some_and(|limit| tick >= limit) {
            return Some(ControlEvent::Quit);
        }
        match phase {
            SessionPhase::GameOver if self.restarts_remaining > 0 => {
                self.restarts_remaining -= 1;
                Some(ControlEvent::Restart)
            }
            SessionPhase::GameOver => Some(ControlEvent::Quit),
            _ => None,
        }
    }
}

/// Replays events at fixed ticks.
#[derive(Debug, Clone, Default)]
pub struct ScriptedControls {
    events: VecDeque<(u64, ControlEvent)>,
}

impl ScriptedControls {
    /// `events` must be ordered by tick.
    pub fn new(events: impl IntoIterator<Item = (u64, ControlEvent)>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl ControlSource for ScriptedControls {
    fn poll(&mut self, _phase: SessionPhase, tick: u64) -> Option<ControlEvent> {
        match self.events.front() {
            Some(&(at, event)) if at <= tick => {
                self.events.pop_front();
                Some(event)
            }
            _ => None,
        }
    }
}

/// Turns a raised interrupt flag into [`ControlEvent::Quit`], deferring to
/// `inner` otherwise.
#[derive(Debug, Clone)]
pub struct InterruptibleControls<C> {
    inner: C,
    interrupted: Arc<AtomicBool>,
}

impl<C: ControlSource> InterruptibleControls<C> {
    pub fn new(inner: C, interrupted: Arc<AtomicBool>) -> Self {
        Self { inner, interrupted }
    }
}

impl<C: ControlSource> ControlSource for InterruptibleControls<C> {
    fn poll(&mut self, phase: SessionPhase, tick: u64) -> Option<ControlEvent> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Some(ControlEvent::Quit);
        }
        self.inner.poll(phase, tick)
    }
}

/// Flag raised by the first Ctrl-C after this call.
///
/// A background thread waits for the signal on a single-threaded runtime.
/// Once it is listening the signal no longer terminates the process, so the
/// session can quit through its normal save path.
pub fn interrupt_flag() -> Result<Arc<AtomicBool>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| Error::Io {
            operation: "start the signal runtime".to_string(),
            source,
        })?;

    let flag = Arc::new(AtomicBool::new(false));
    let raised = Arc::clone(&flag);
    thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || match runtime.block_on(tokio::signal::ctrl_c()) {
            Ok(()) => {
                info!("interrupt received, quitting after this tick");
                raised.store(true, Ordering::SeqCst);
            }
            Err(error) => warn!(%error, "cannot listen for Ctrl-C"),
        })
        .map_err(|source| Error::Io {
            operation: "spawn the signal thread".to_string(),
            source,
        })?;
    Ok(flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_restarts_then_quits() {
        let mut controls = HeadlessControls::new(None, 1);
        assert_eq!(controls.poll(SessionPhase::Running, 0), None);
        assert_eq!(
            controls.poll(SessionPhase::GameOver, 1),
            Some(ControlEvent::Restart)
        );
        assert_eq!(
            controls.poll(SessionPhase::GameOver, 2),
            Some(ControlEvent::Quit)
        );
    }

    #[test]
    fn test_headless_tick_budget() {
        let mut controls = HeadlessControls::new(Some(10), 3);
        assert_eq!(controls.poll(SessionPhase::Running, 9), None);
        assert_eq!(
            controls.poll(SessionPhase::Running, 10),
            Some(ControlEvent::Quit)
        );
    }

    #[test]
    fn test_scripted_events_fire_once_in_order() {
        let mut controls =
            ScriptedControls::new([(2, ControlEvent::Restart), (5, ControlEvent::Quit)]);
        assert_eq!(controls.poll(SessionPhase::Running, 1), None);
        assert_eq!(
            controls.poll(SessionPhase::GameOver, 3),
            Some(ControlEvent::Restart)
        );
        assert_eq!(controls.poll(SessionPhase::Running, 4), None);
        assert_eq!(
            controls.poll(SessionPhase::Running, 5),
            Some(ControlEvent::Quit)
        );
        assert_eq!(controls.poll(SessionPhase::Running, 6), None);
    }

    #[test]
    fn test_interrupt_quits_in_any_phase() {
        let interrupted = Arc::new(AtomicBool::new(false));
        let mut controls =
            InterruptibleControls::new(HeadlessControls::new(None, 5), Arc::clone(&interrupted));

        assert_eq!(controls.poll(SessionPhase::Running, 0), None);
        assert_eq!(
            controls.poll(SessionPhase::GameOver, 1),
            Some(ControlEvent::Restart)
        );

        interrupted.store(true, Ordering::SeqCst);
        for phase in [SessionPhase::Running, SessionPhase::GameOver] {
            assert_eq!(controls.poll(phase, 2), Some(ControlEvent::Quit));
        }
    }
}
