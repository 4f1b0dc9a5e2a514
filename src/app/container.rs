//! Dependency injection container for the application.
//!
//! The container owns infrastructure dependencies and provides factory
//! methods for creating agents wired to them.

use std::{path::Path, sync::Arc};

use tracing::info;

use super::config::AgentConfig;
use crate::{
    Result, adapters::MsgPackRepository, ports::QTableRepository, q_learning::QLearningAgent,
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use planewar::app::{AgentConfig, App};
/// use std::path::Path;
///
/// let app = App::new();
/// let agent = app.create_agent(&AgentConfig::new().with_seed(42), Path::new("q_table.msgpack"))?;
/// # Ok::<(), planewar::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use planewar::app::App;
/// use planewar::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for Q-table persistence
    repository: Arc<dyn QTableRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses:
    /// - `MsgPackRepository` for Q-table persistence
    /// - No default seed (non-deterministic RNG)
    pub fn new() -> Self {
        Self {
            repository: Arc::new(MsgPackRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the Q-table repository.
    ///
    /// Returns an Arc-wrapped repository that can be shared with the loops.
    pub fn repository(&self) -> Arc<dyn QTableRepository + Send + Sync> {
        Arc::clone(&self.repository)
    }

    /// Create an agent with an empty table.
    pub fn new_agent(&self, config: &AgentConfig) -> Result<QLearningAgent> {
        config.validate()?;
        let agent = QLearningAgent::new(
            config.learning_rate,
            config.discount_factor,
            config.epsilon,
            config.epsilon_decay,
            config.min_epsilon,
        );

        // Apply seed from config or use container default
        Ok(match config.seed.or(self.default_seed) {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        })
    }

    /// Create an agent and load its table from `path`.
    ///
    /// A missing snapshot is not an error: the agent starts with an empty
    /// table. A corrupt one is.
    pub fn create_agent(&self, config: &AgentConfig, path: &Path) -> Result<QLearningAgent> {
        let mut agent = self.new_agent(config)?;
        if agent.reload(self.repository.as_ref(), path)? {
            info!(
                path = %path.display(),
                states = agent.q_table_size(),
                episodes_trained = agent.metadata().episodes_trained,
                "Q-table loaded from file"
            );
        } else {
            info!(path = %path.display(), "No Q-table file found, starting with an empty Q-table");
        }
        Ok(agent)
    }

    /// Save an agent's table to persistent storage.
    pub fn save_agent(&self, agent: &QLearningAgent, path: &Path) -> Result<()> {
        agent.save(self.repository.as_ref(), path)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
pub struct AppBuilder {
    repository: Option<Arc<dyn QTableRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self {
            repository: None,
            default_seed: None,
        }
    }

    /// Set a custom Q-table repository.
    pub fn with_repository<R: QTableRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no repository was specified, uses `MsgPackRepository` by default.
    pub fn build(self) -> App {
        App {
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
