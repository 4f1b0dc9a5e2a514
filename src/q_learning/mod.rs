//! Tabular Q-learning core
//!
//! The decision-making half of the game: positions are reduced to a coarse
//! [`State`], an epsilon-greedy policy picks an [`Action`](crate::types::Action)
//! from the [`QTable`], and every tick's reward is folded back in with the
//! Q-learning rule
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use planewar::q_learning::{QLearningAgent, State};
//! use planewar::types::Action;
//!
//! let mut agent = QLearningAgent::new(
//!     0.1,   // learning_rate
//!     0.9,   // discount_factor
//!     0.1,   // epsilon (exploration)
//!     0.995, // epsilon_decay
//!     0.01,  // min_epsilon
//! )
//! .with_seed(7);
//!
//! let state = State::new(2, 3, 0, 5);
//! let action = agent.choose_action(&state)?;
//! agent.learn(&state, action, 46.0, &State::new(2, 2, 0, 5))?;
//! agent.decay_epsilon();
//! assert_eq!(agent.q_table_size(), 2);
//! # Ok::<(), planewar::Error>(())
//! ```

pub mod agent;
pub mod discretizer;
pub mod policy;
pub mod q_table;
pub mod serialization;
pub mod state;

// Public re-exports
pub use agent::QLearningAgent;
pub use discretizer::{Discretizer, discretize};
pub use policy::EpsilonGreedy;
pub use q_table::{ActionValues, QTable};
pub use serialization::{SavedQTable, TrainingMetadata};
pub use state::{State, StateBuilder};
