//! Training and live-play loops
//!
//! This module provides:
//! - Reward shaping for one tick of play
//! - The episodic training loop
//! - The live session loop with its phase machine and tick pacing
//! - Observer adapters recording what happens along the way

pub mod live;
pub mod observers;
pub mod reward;
pub mod scheduler;
pub mod session;
pub mod tick;
pub mod training;

pub use live::{LiveLoop, LiveResult};
// Re-export observer implementations (adapters)
pub use observers::{JsonlObserver, LoggingObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use reward::{DeathRule, RewardRules, TickOutcome, evaluate};
pub use scheduler::{DEFAULT_TICK_RATE, FixedRateScheduler, TickScheduler, Unpaced};
pub use session::{Session, SessionPhase};
pub use tick::{TickStep, observe, observe_player, run_tick};
pub use training::{TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::Observer;
