//! Epsilon-greedy action selection with multiplicative epsilon decay.

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use super::{q_table::QTable, state::State};
use crate::{Error, Result, types::Action};

pub const DEFAULT_EPSILON: f64 = 0.1;
pub const DEFAULT_MIN_EPSILON: f64 = 0.01;
pub const DEFAULT_EPSILON_DECAY: f64 = 0.995;

/// Epsilon-greedy policy over a [`QTable`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    epsilon: f64,
    initial_epsilon: f64,
    min_epsilon: f64,
    epsilon_decay: f64,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64, min_epsilon: f64, epsilon_decay: f64) -> Self {
        Self {
            epsilon,
            initial_epsilon: epsilon,
            min_epsilon,
            epsilon_decay,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn min_epsilon(&self) -> f64 {
        self.min_epsilon
    }

    pub fn epsilon_decay(&self) -> f64 {
        self.epsilon_decay
    }

    /// Explore with probability ε or when the state is unseen, otherwise
    /// take the greedy action. Never touches the table.
    pub fn choose<R: Rng>(&self, table: &QTable, state: &State, rng: &mut R) -> Result<Action> {
        let explore = rng.random::<f64>() < self.epsilon;
        match table.greedy_action(state) {
            Some(action) if !explore => Ok(action),
            _ => Action::ALL
                .choose(rng)
                .copied()
                .ok_or_else(|| Error::InvariantViolation {
                    message: "action set is empty".to_string(),
                }),
        }
    }

    /// Decay with the configured floor and rate.
    pub fn decay(&mut self) {
        self.decay_with(self.min_epsilon, self.epsilon_decay);
    }

    pub fn decay_with(&mut self, floor: f64, rate: f64) {
        self.epsilon = (self.epsilon * rate).max(floor);
    }

    /// Restore the initial exploration rate.
    pub fn reset(&mut self) {
        self.epsilon = self.initial_epsilon;
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON, DEFAULT_MIN_EPSILON, DEFAULT_EPSILON_DECAY)
    }
}
