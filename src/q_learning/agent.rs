//! Tabular Q-learning agent
//!
//! Combines a [`QTable`], an epsilon-greedy policy and the Q-learning update
//! rule. Storage is reached only through a [`QTableRepository`].

use std::path::Path;

use rand::{SeedableRng, rngs::StdRng};
use tracing::debug;

use super::{
    policy::EpsilonGreedy,
    q_table::QTable,
    serialization::{SavedQTable, TrainingMetadata},
    state::State,
};
use crate::{Error, Result, ports::QTableRepository, types::Action};

pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.9;

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent (off-policy TD control)
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    policy: EpsilonGreedy,
    learning_rate: f64,
    discount_factor: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
    metadata: TrainingMetadata,
}

impl QLearningAgent {
    /// Create a new Q-learning agent with an empty table
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - α parameter (0.0 to 1.0)
    /// * `discount_factor` - γ parameter (0.0 to 1.0)
    /// * `epsilon` - Initial exploration rate
    /// * `epsilon_decay` - Multiplicative decay per tick
    /// * `min_epsilon` - Minimum exploration rate
    pub fn new(
        learning_rate: f64,
        discount_factor: f64,
        epsilon: f64,
        epsilon_decay: f64,
        min_epsilon: f64,
    ) -> Self {
        Self {
            q_table: QTable::new(),
            policy: EpsilonGreedy::new(epsilon, min_epsilon, epsilon_decay),
            learning_rate,
            discount_factor,
            rng: build_rng(None),
            rng_seed: None,
            metadata: TrainingMetadata::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_q_table(mut self, q_table: QTable) -> Self {
        self.q_table = q_table;
        self
    }

    /// ε-greedy action selection; does not add `state` to the table.
    pub fn choose_action(&mut self, state: &State) -> Result<Action> {
        self.policy.choose(&self.q_table, state, &mut self.rng)
    }

    /// Apply one Q-learning update and return the new Q(s, a).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReward`] for NaN or infinite rewards; the table
    /// is left untouched in that case.
    pub fn learn(
        &mut self,
        state: &State,
        action: Action,
        reward: f64,
        next_state: &State,
    ) -> Result<f64> {
        if !reward.is_finite() {
            return Err(Error::InvalidReward { value: reward });
        }
        Ok(self.q_table.q_learning_update(
            *state,
            action,
            reward,
            *next_state,
            self.learning_rate,
            self.discount_factor,
        ))
    }

    /// Decay epsilon with the configured floor and rate
    pub fn decay_epsilon(&mut self) {
        self.policy.decay();
    }

    pub fn decay_epsilon_with(&mut self, floor: f64, rate: f64) {
        self.policy.decay_with(floor, rate);
    }

    pub fn epsilon(&self) -> f64 {
        self.policy.epsilon()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_table_size(&self) -> usize {
        self.q_table.len()
    }

    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }

    /// Account for finished training work in the persisted metadata.
    pub fn record_training(&mut self, episodes: usize, ticks: u64) {
        self.metadata.episodes_trained += episodes;
        self.metadata.ticks_trained += ticks;
    }

    /// Replace the table with the one stored at `path`.
    ///
    /// A missing snapshot leaves an empty table and returns `Ok(false)`.
    pub fn reload(&mut self, repository: &dyn QTableRepository, path: &Path) -> Result<bool> {
        match repository.load(path)? {
            Some(saved) => {
                self.q_table = saved.to_q_table(path)?;
                self.metadata = saved.metadata;
                debug!(states = self.q_table.len(), "agent table reloaded");
                Ok(true)
            }
            None => {
                self.q_table = QTable::new();
                self.metadata = TrainingMetadata::default();
                Ok(false)
            }
        }
    }

    /// Persist the current table and metadata.
    pub fn save(&self, repository: &dyn QTableRepository, path: &Path) -> Result<()> {
        repository.save(&self.snapshot(), path)
    }

    pub fn snapshot(&self) -> SavedQTable {
        let metadata = TrainingMetadata {
            seed: self.rng_seed,
            epsilon: Some(self.epsilon()),
            ..self.metadata.clone()
        };
        SavedQTable::from_q_table(&self.q_table, metadata)
    }

    /// Clear the table and restore the initial exploration rate.
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.policy.reset();
        self.metadata = TrainingMetadata::default();
        self.rng = build_rng(self.rng_seed);
    }
}

impl Default for QLearningAgent {
    fn default() -> Self {
        let policy = EpsilonGreedy::default();
        Self::new(
            DEFAULT_LEARNING_RATE,
            DEFAULT_DISCOUNT_FACTOR,
            policy.epsilon(),
            policy.epsilon_decay(),
            policy.min_epsilon(),
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, rngs::StdRng};

    use super::*;
    use crate::adapters::InMemoryRepository;

    fn random_state(rng: &mut StdRng) -> State {
        State::new(
            rng.random_range(0..5),
            rng.random_range(0..5),
            rng.random_range(0..5),
            rng.random_range(0..5),
        )
    }

    #[test]
    fn test_choose_does_not_mutate_table() {
        let mut agent = QLearningAgent::default().with_seed(1);
        for i in 0..20 {
            agent.choose_action(&State::new(i, 0, 0, 0)).unwrap();
        }
        assert_eq!(agent.q_table_size(), 0);
    }

    #[test]
    fn test_learn_inserts_both_states() {
        let mut agent = QLearningAgent::default().with_seed(2);
        let state = State::new(1, 2, 3, 4);
        let next_state = State::new(4, 3, 2, 1);

        agent.learn(&state, Action::Right, 2.0, &next_state).unwrap();

        for s in [state, next_state] {
            let values = agent.q_table().values(&s).unwrap();
            assert_eq!(values.iter().count(), Action::COUNT);
        }
    }

    #[test]
    fn test_non_finite_reward_rejected_without_mutation() {
        let mut agent = QLearningAgent::default();
        for reward in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = agent
                .learn(&State::default(), Action::Up, reward, &State::new(1, 1, 1, 1))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidReward { .. }));
        }
        assert_eq!(agent.q_table_size(), 0);
    }

    #[test]
    fn test_update_contracts_toward_target() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let alpha: f64 = rng.random_range(0.0..=1.0);
            let gamma: f64 = rng.random_range(0.0..=1.0);
            let mut agent = QLearningAgent::new(alpha, gamma, 0.0, 1.0, 0.0).with_seed(5);

            // warm up the table with arbitrary history
            for _ in 0..10 {
                let s = random_state(&mut rng);
                let a = Action::ALL[rng.random_range(0..Action::COUNT)];
                let r = rng.random_range(-100.0..100.0);
                let s2 = random_state(&mut rng);
                agent.learn(&s, a, r, &s2).unwrap();
            }

            let state = random_state(&mut rng);
            let next_state = random_state(&mut rng);
            let action = Action::ALL[rng.random_range(0..Action::COUNT)];
            let reward = rng.random_range(-100.0..100.0);

            let old_q = agent.q_table().get(&state, action);
            let target = reward + gamma * agent.q_table().max_q(&next_state);
            let new_q = agent.learn(&state, action, reward, &next_state).unwrap();

            if state != next_state {
                assert!((new_q - target).abs() <= (old_q - target).abs() + 1e-9);
            }
        }
    }

    #[test]
    fn test_decay_epsilon_stops_at_floor() {
        let mut agent = QLearningAgent::new(0.1, 0.9, 0.2, 0.5, 0.05);
        agent.decay_epsilon();
        assert_eq!(agent.epsilon(), 0.1);
        agent.decay_epsilon();
        agent.decay_epsilon();
        assert_eq!(agent.epsilon(), 0.05);

        agent.decay_epsilon_with(0.01, 0.5);
        assert_eq!(agent.epsilon(), 0.025);
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let repo = InMemoryRepository::new();
        let path = Path::new("agent");

        let mut agent = QLearningAgent::default().with_seed(3);
        agent
            .learn(&State::new(1, 0, 0, 0), Action::Avoid, 5.0, &State::new(0, 0, 0, 0))
            .unwrap();
        agent.record_training(2, 40);
        agent.save(&repo, path).unwrap();

        let mut fresh = QLearningAgent::default();
        assert!(fresh.reload(&repo, path).unwrap());
        assert_eq!(fresh.q_table(), agent.q_table());
        assert_eq!(fresh.metadata().episodes_trained, 2);
        assert_eq!(fresh.metadata().ticks_trained, 40);
    }

    #[test]
    fn test_reload_missing_leaves_empty_table() {
        let repo = InMemoryRepository::new();
        let mut agent = QLearningAgent::default();
        agent
            .learn(&State::default(), Action::Up, 1.0, &State::default())
            .unwrap();

        assert!(!agent.reload(&repo, Path::new("missing")).unwrap());
        assert_eq!(agent.q_table_size(), 0);
    }

    #[test]
    fn test_reset_restores_initial_epsilon() {
        let mut agent = QLearningAgent::new(0.1, 0.9, 0.4, 0.5, 0.01);
        agent
            .learn(&State::default(), Action::Up, 1.0, &State::default())
            .unwrap();
        agent.decay_epsilon();

        agent.reset();

        assert_eq!(agent.epsilon(), 0.4);
        assert_eq!(agent.q_table_size(), 0);
    }
}
