//! Tick pacing for the live loop

use std::time::{Duration, Instant};

use tracing::warn;

use crate::{Error, Result};

pub const DEFAULT_TICK_RATE: u32 = 100;

/// Paces ticks; called once at the end of every tick.
pub trait TickScheduler {
    fn wait_next(&mut self);
}

/// Sleeps so that ticks start at a fixed rate.
///
/// A tick that overruns its slot is not made up for; the schedule restarts
/// from the late tick instead of bursting to catch up.
#[derive(Debug)]
pub struct FixedRateScheduler {
    period: Duration,
    next_deadline: Option<Instant>,
    overruns: u64,
}

impl FixedRateScheduler {
    pub fn new(ticks_per_second: u32) -> Result<Self> {
        if ticks_per_second == 0 {
            return Err(Error::InvalidConfiguration {
                message: "tick rate must be at least 1 tick per second".to_string(),
            });
        }
        Ok(Self {
            period: Duration::from_secs(1) / ticks_per_second,
            next_deadline: None,
            overruns: 0,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks that finished after their deadline.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}

impl TickScheduler for FixedRateScheduler {
    fn wait_next(&mut self) {
        let now = Instant::now();
        let deadline = *self.next_deadline.get_or_insert(now + self.period);
        if now < deadline {
            std::thread::sleep(deadline - now);
            self.next_deadline = Some(deadline + self.period);
        } else {
            self.overruns += 1;
            if self.overruns.is_multiple_of(100) {
                warn!(
                    overruns = self.overruns,
                    late_ms = (now - deadline).as_secs_f64() * 1000.0,
                    "ticks are overrunning the target rate"
                );
            }
            self.next_deadline = Some(now + self.period);
        }
    }
}

/// Runs ticks back to back, for training and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unpaced;

impl TickScheduler for Unpaced {
    fn wait_next(&mut self) {}
}
