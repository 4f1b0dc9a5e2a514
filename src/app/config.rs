//! Configuration types for agent and session creation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    arena::ArenaConfig,
    pipeline::{RewardRules, TrainingConfig},
    q_learning::{
        Discretizer, StateBuilder,
        agent::{DEFAULT_DISCOUNT_FACTOR, DEFAULT_LEARNING_RATE},
        discretizer::DEFAULT_STEP,
        policy::{DEFAULT_EPSILON, DEFAULT_EPSILON_DECAY, DEFAULT_MIN_EPSILON},
    },
};

pub const DEFAULT_Q_TABLE_PATH: &str = "q_table.msgpack";

/// Configuration for creating a Q-learning agent.
///
/// # Examples
///
/// ```
/// use planewar::app::AgentConfig;
///
/// let config = AgentConfig::new()
///     .with_learning_rate(0.2)
///     .with_epsilon(0.3)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// α, step size of the update
    pub learning_rate: f64,
    /// γ, weight of the next state's best value
    pub discount_factor: f64,
    /// Initial exploration rate
    pub epsilon: f64,
    /// Exploration floor
    pub min_epsilon: f64,
    /// Multiplicative decay applied every tick
    pub epsilon_decay: f64,
    /// Bucket width of the state discretization
    pub step: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            discount_factor: DEFAULT_DISCOUNT_FACTOR,
            epsilon: DEFAULT_EPSILON,
            min_epsilon: DEFAULT_MIN_EPSILON,
            epsilon_decay: DEFAULT_EPSILON_DECAY,
            step: DEFAULT_STEP,
            seed: None,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_min_epsilon(mut self, min_epsilon: f64) -> Self {
        self.min_epsilon = min_epsilon;
        self
    }

    pub fn with_epsilon_decay(mut self, epsilon_decay: f64) -> Self {
        self.epsilon_decay = epsilon_decay;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
            ("epsilon", self.epsilon),
            ("min_epsilon", self.min_epsilon),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must lie in [0, 1], got {value}"),
                });
            }
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("epsilon_decay must lie in (0, 1], got {}", self.epsilon_decay),
            });
        }
        Discretizer::new(self.step)?;
        Ok(())
    }

    /// State builder using this configuration's bucket width.
    pub fn state_builder(&self) -> Result<StateBuilder> {
        Ok(StateBuilder::new(Discretizer::new(self.step)?))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Reward shaping for both loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardPresets {
    pub training: RewardRules,
    pub live: RewardRules,
}

impl Default for RewardPresets {
    fn default() -> Self {
        Self {
            training: RewardRules::training(),
            live: RewardRules::live(),
        }
    }
}

/// Everything a `train` or `play` session needs, loadable from JSON.
///
/// Missing sections and fields fall back to their defaults.
///
/// # Examples
///
/// ```
/// use planewar::app::SessionConfig;
///
/// let config: SessionConfig =
///     serde_json::from_str(r#"{ "agent": { "epsilon": 0.5 }, "q_table": "run.msgpack" }"#)?;
/// assert_eq!(config.agent.epsilon, 0.5);
/// assert_eq!(config.rewards.training.death_penalty, -100.0);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub agent: AgentConfig,
    pub rewards: RewardPresets,
    pub arena: ArenaConfig,
    pub training: TrainingConfig,
    /// Where the Q-table is loaded from and saved to
    pub q_table: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            rewards: RewardPresets::default(),
            arena: ArenaConfig::default(),
            training: TrainingConfig::default(),
            q_table: PathBuf::from(DEFAULT_Q_TABLE_PATH),
        }
    }
}

impl SessionConfig {
    /// Read a JSON configuration file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            operation: format!("create config {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;
        self.rewards.training.validate()?;
        self.rewards.live.validate()?;
        self.arena.validate()?;
        self.training.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AgentConfig::default().validate().is_ok());
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(AgentConfig::new().with_learning_rate(1.5).validate().is_err());
        assert!(AgentConfig::new().with_discount_factor(-0.1).validate().is_err());
        assert!(AgentConfig::new().with_epsilon(f64::NAN).validate().is_err());
        assert!(AgentConfig::new().with_epsilon_decay(0.0).validate().is_err());
        assert!(AgentConfig::new().with_step(0.0).validate().is_err());
    }

    #[test]
    fn test_session_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut config = SessionConfig::default();
        config.agent = config.agent.with_seed(9);
        config.training.episodes = 3;
        config.save(&path).unwrap();

        let loaded = SessionConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{ "agent": { "learning_rate": 3.0 } }"#).unwrap();

        let err = SessionConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }
}
