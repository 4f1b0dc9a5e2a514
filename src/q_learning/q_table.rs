//! Q-table implementation for temporal difference learning

use std::collections::{HashMap, hash_map};

use serde::{Deserialize, Serialize};

use super::state::State;
use crate::types::Action;

/// Value estimates for every action of one state, indexed by [`Action::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionValues([f64; Action::COUNT]);

impl ActionValues {
    pub fn new(values: [f64; Action::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, action: Action) -> f64 {
        self.0[action.index()]
    }

    pub fn set(&mut self, action: Action, value: f64) {
        self.0[action.index()] = value;
    }

    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Highest-valued action; ties go to the lowest action index.
    pub fn best_action(&self) -> Action {
        let mut best = Action::ALL[0];
        for action in Action::ALL.into_iter().skip(1) {
            if self.get(action) > self.get(best) {
                best = action;
            }
        }
        best
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        Action::ALL.into_iter().map(|action| (action, self.get(action)))
    }

    pub fn as_array(&self) -> &[f64; Action::COUNT] {
        &self.0
    }
}

/// Q-table mapping states to per-action value estimates.
///
/// A state, once present, always carries a value for every action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    q_values: HashMap<State, ActionValues>,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new() -> Self {
        Self::default()
    }

    /// Q-value for a state-action pair, 0.0 for unseen states.
    pub fn get(&self, state: &State, action: Action) -> f64 {
        self.q_values
            .get(state)
            .map(|values| values.get(action))
            .unwrap_or(0.0)
    }

    pub fn values(&self, state: &State) -> Option<&ActionValues> {
        self.q_values.get(state)
    }

    pub fn contains(&self, state: &State) -> bool {
        self.q_values.contains_key(state)
    }

    /// Insert `state` with all actions at 0.0 unless it is already present.
    pub fn ensure_state(&mut self, state: State) -> &mut ActionValues {
        self.q_values.entry(state).or_default()
    }

    /// Maximum Q-value over all actions in a state (0.0 for unseen states)
    pub fn max_q(&self, state: &State) -> f64 {
        self.q_values
            .get(state)
            .map(ActionValues::max)
            .unwrap_or(0.0)
    }

    /// Greedy action for a known state, ties broken by lowest action index.
    pub fn greedy_action(&self, state: &State) -> Option<Action> {
        self.q_values.get(state).map(ActionValues::best_action)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Both `state` and `next_state` are inserted if missing. Returns the new value.
    pub fn q_learning_update(
        &mut self,
        state: State,
        action: Action,
        reward: f64,
        next_state: State,
        learning_rate: f64,
        discount_factor: f64,
    ) -> f64 {
        self.ensure_state(state);
        let max_next_q = self.ensure_state(next_state).max();
        let td_target = reward + discount_factor * max_next_q;

        let values = self.ensure_state(state);
        let current_q = values.get(action);
        let new_q = current_q + learning_rate * (td_target - current_q);
        values.set(action, new_q);
        new_q
    }

    pub fn insert(&mut self, state: State, values: ActionValues) {
        self.q_values.insert(state, values);
    }

    pub fn iter(&self) -> hash_map::Iter<'_, State, ActionValues> {
        self.q_values.iter()
    }

    /// Entries ordered by state, for stable output.
    pub fn sorted_entries(&self) -> Vec<(State, ActionValues)> {
        let mut entries: Vec<_> = self
            .q_values
            .iter()
            .map(|(state, values)| (*state, *values))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }

    /// Remove every entry
    pub fn reset(&mut self) {
        self.q_values.clear();
    }

    /// Number of states stored
    pub fn len(&self) -> usize {
        self.q_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }
}

impl FromIterator<(State, ActionValues)> for QTable {
    fn from_iter<T: IntoIterator<Item = (State, ActionValues)>>(iter: T) -> Self {
        Self {
            q_values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(a: i64) -> State {
        State::new(a, a, a, a)
    }

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new();
        assert_eq!(qtable.get(&s(1), Action::Up), 0.0);
        assert!(qtable.is_empty());
        assert!(!qtable.contains(&s(1)));
    }

    #[test]
    fn test_ensure_state_fills_every_action() {
        let mut qtable = QTable::new();
        qtable.ensure_state(s(2));

        let values = qtable.values(&s(2)).unwrap();
        assert_eq!(values.iter().count(), Action::COUNT);
        assert!(values.iter().all(|(_, q)| q == 0.0));
    }

    #[test]
    fn test_ensure_state_keeps_existing_values() {
        let mut qtable = QTable::new();
        qtable.ensure_state(s(2)).set(Action::Left, 1.5);
        qtable.ensure_state(s(2));
        assert_eq!(qtable.get(&s(2), Action::Left), 1.5);
        assert_eq!(qtable.len(), 1);
    }

    #[test]
    fn test_max_q() {
        let mut qtable = QTable::new();
        let values = qtable.ensure_state(s(0));
        values.set(Action::Up, 0.5);
        values.set(Action::Down, 1.5);
        values.set(Action::Avoid, 0.8);

        assert_eq!(qtable.max_q(&s(0)), 1.5);
        assert_eq!(qtable.max_q(&s(9)), 0.0);
    }

    #[test]
    fn test_greedy_action() {
        let mut qtable = QTable::new();
        let values = qtable.ensure_state(s(0));
        values.set(Action::Up, 0.5);
        values.set(Action::Right, 1.5);
        values.set(Action::Avoid, 0.8);

        assert_eq!(qtable.greedy_action(&s(0)), Some(Action::Right));
        assert_eq!(qtable.greedy_action(&s(1)), None);
    }

    #[test]
    fn test_greedy_tie_breaks_to_lowest_index() {
        let mut qtable = QTable::new();
        let values = qtable.ensure_state(s(0));
        values.set(Action::Left, 2.0);
        values.set(Action::Avoid, 2.0);
        assert_eq!(qtable.greedy_action(&s(0)), Some(Action::Left));

        qtable.ensure_state(s(1));
        assert_eq!(qtable.greedy_action(&s(1)), Some(Action::Up));
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new();
        let next = qtable.ensure_state(s(1));
        next.set(Action::Down, 1.0);
        next.set(Action::Left, 2.0);

        let updated = qtable.q_learning_update(s(0), Action::Avoid, 0.0, s(1), 0.5, 0.99);

        // Q(s,avoid) = 0.0 + 0.5 * (0.0 + 0.99 * 2.0 - 0.0) = 0.99
        assert!((updated - 0.99).abs() < 1e-12);
        assert!((qtable.get(&s(0), Action::Avoid) - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_update_inserts_both_states() {
        let mut qtable = QTable::new();
        qtable.q_learning_update(s(3), Action::Up, -10.0, s(4), 0.1, 0.9);

        assert!(qtable.contains(&s(3)));
        assert!(qtable.contains(&s(4)));
        assert!((qtable.get(&s(3), Action::Up) + 1.0).abs() < 1e-12);
        assert_eq!(qtable.get(&s(4), Action::Up), 0.0);
    }

    #[test]
    fn test_self_transition_uses_pre_update_max() {
        let mut qtable = QTable::new();
        qtable.ensure_state(s(0)).set(Action::Up, 4.0);

        let updated = qtable.q_learning_update(s(0), Action::Up, 1.0, s(0), 0.5, 0.5);

        // target = 1 + 0.5 * 4 = 3; 4 + 0.5 * (3 - 4) = 3.5
        assert!((updated - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_sorted_entries_are_ordered() {
        let mut qtable = QTable::new();
        qtable.ensure_state(s(5));
        qtable.ensure_state(s(1));
        qtable.ensure_state(s(3));

        let states: Vec<_> = qtable.sorted_entries().into_iter().map(|(s, _)| s).collect();
        assert_eq!(states, vec![s(1), s(3), s(5)]);
    }
}
