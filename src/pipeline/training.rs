//! Episodic training loop

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    reward::RewardRules,
    session::Session,
    tick::{observe_player, run_tick},
};
use crate::{
    Error, Result,
    ports::{EpisodeEnd, EpisodeSummary, Observer, QTableRepository, TickReport, World},
    q_learning::{QLearningAgent, StateBuilder},
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of episodes to run
    pub episodes: usize,

    /// Tick budget per episode
    pub max_steps: usize,

    /// Save the table after every this many episodes
    pub checkpoint_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            max_steps: 1000,
            checkpoint_every: 1,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_steps must be at least 1".to_string(),
            });
        }
        if self.checkpoint_every == 0 {
            return Err(Error::InvalidConfiguration {
                message: "checkpoint_every must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes played
    pub episodes: usize,

    /// Ticks played across all episodes
    pub total_ticks: u64,

    /// Episodes that ended with the player shot down
    pub deaths: usize,

    /// Enemies destroyed across all episodes
    pub total_kills: usize,

    pub best_score: u32,

    /// Mean total reward per episode
    pub mean_reward: f64,

    pub final_epsilon: f64,

    pub q_table_states: usize,

    /// Total reward of every episode, in order
    pub episode_rewards: Vec<f64>,
}

impl TrainingResult {
    fn from_summaries(summaries: &[EpisodeSummary], agent: &QLearningAgent) -> Self {
        let rewards: Vec<f64> = summaries.iter().map(|s| s.total_reward).collect();
        let mean_reward = if rewards.is_empty() {
            0.0
        } else {
            rewards.iter().sum::<f64>() / rewards.len() as f64
        };
        Self {
            episodes: summaries.len(),
            total_ticks: summaries.iter().map(|s| s.steps as u64).sum(),
            deaths: summaries
                .iter()
                .filter(|s| s.end == EpisodeEnd::Died)
                .count(),
            total_kills: summaries.iter().map(|s| s.kills).sum(),
            best_score: summaries.iter().map(|s| s.score).max().unwrap_or(0),
            mean_reward,
            final_epsilon: agent.epsilon(),
            q_table_states: agent.q_table_size(),
            episode_rewards: rewards,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Where and how often the table is persisted during training.
#[derive(Clone)]
struct Checkpoint {
    repository: Arc<dyn QTableRepository + Send + Sync>,
    path: PathBuf,
}

/// Runs training episodes against a [`World`]
///
/// Each episode resets the world, then runs the tick cycle until the step
/// budget is spent or the player dies. A death tick is still learned from,
/// but the world is not advanced past it.
pub struct TrainingPipeline {
    config: TrainingConfig,
    rules: RewardRules,
    state_builder: StateBuilder,
    observers: Vec<Box<dyn Observer>>,
    checkpoint: Option<Checkpoint>,
}

impl TrainingPipeline {
    /// Create a new training pipeline with the training reward preset
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            rules: RewardRules::training(),
            state_builder: StateBuilder::default(),
            observers: Vec::new(),
            checkpoint: None,
        }
    }

    pub fn with_rules(mut self, rules: RewardRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_state_builder(mut self, state_builder: StateBuilder) -> Self {
        self.state_builder = state_builder;
        self
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Persist the table at `path` on every checkpoint and at the end.
    pub fn with_checkpoint(
        mut self,
        repository: Arc<dyn QTableRepository + Send + Sync>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.checkpoint = Some(Checkpoint {
            repository,
            path: path.into(),
        });
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run every configured episode.
    pub fn run<W>(&mut self, agent: &mut QLearningAgent, world: &mut W) -> Result<TrainingResult>
    where
        W: World + ?Sized,
    {
        self.config.validate()?;
        self.rules.validate()?;

        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        let mut session = Session::new();
        let mut summaries = Vec::with_capacity(self.config.episodes);
        let mut saved_after = None;

        for episode in 0..self.config.episodes {
            let summary = self.run_episode(episode, agent, world, &mut session)?;
            agent.record_training(1, summary.steps as u64);

            debug!(
                episode,
                steps = summary.steps,
                total_reward = summary.total_reward,
                "episode finished"
            );
            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }
            summaries.push(summary);

            if (episode + 1).is_multiple_of(self.config.checkpoint_every) {
                self.save_checkpoint(agent)?;
                saved_after = Some(episode);
            }
        }

        if saved_after.map(|e| e + 1) != Some(self.config.episodes) {
            self.save_checkpoint(agent)?;
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        Ok(TrainingResult::from_summaries(&summaries, agent))
    }

    fn run_episode<W>(
        &mut self,
        episode: usize,
        agent: &mut QLearningAgent,
        world: &mut W,
        session: &mut Session,
    ) -> Result<EpisodeSummary>
    where
        W: World + ?Sized,
    {
        world.reset();
        session.begin_episode(episode);
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut state = observe_player(&self.state_builder, world)?;
        let mut total_reward = 0.0;
        let mut kills = 0;
        let mut steps = 0;
        let mut end = EpisodeEnd::MaxSteps;

        for step in 0..self.config.max_steps {
            let tick = run_tick(
                agent,
                world,
                &self.state_builder,
                &self.rules,
                session,
                &state,
            )?;
            steps = step + 1;
            total_reward += tick.outcome.reward;
            kills += tick.outcome.kills;

            let report = TickReport {
                episode,
                step,
                state,
                action: tick.action,
                reward: tick.outcome.reward,
                next_state: tick.next_state,
                kills: tick.outcome.kills,
                score: session.score(),
                epsilon: agent.epsilon(),
                terminated: tick.outcome.terminated,
            };
            for observer in &mut self.observers {
                for explosion in &tick.outcome.explosions {
                    observer.on_explosion(explosion)?;
                }
                observer.on_tick(&report)?;
            }

            if tick.outcome.terminated {
                debug!(episode, step, "player shot down");
                end = EpisodeEnd::Died;
                break;
            }

            world.advance();
            state = tick.next_state;
        }

        Ok(EpisodeSummary {
            episode,
            total_episodes: Some(self.config.episodes),
            steps,
            total_reward,
            score: session.score(),
            kills,
            epsilon: agent.epsilon(),
            q_table_states: agent.q_table_size(),
            end,
        })
    }

    fn save_checkpoint(&self, agent: &QLearningAgent) -> Result<()> {
        if let Some(checkpoint) = &self.checkpoint {
            agent.save(checkpoint.repository.as_ref(), &checkpoint.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::InMemoryRepository,
        arena::{Arena, ArenaConfig},
    };

    fn agent() -> QLearningAgent {
        QLearningAgent::new(0.1, 0.9, 0.1, 0.995, 0.01).with_seed(42)
    }

    #[test]
    fn test_training_pipeline() {
        let config = TrainingConfig {
            episodes: 3,
            max_steps: 50,
            checkpoint_every: 1,
        };

        let mut pipeline = TrainingPipeline::new(config);
        let mut agent = agent();
        let mut arena = Arena::new(ArenaConfig::default()).unwrap().with_seed(7);

        let result = pipeline.run(&mut agent, &mut arena).unwrap();

        assert_eq!(result.episodes, 3);
        assert_eq!(result.episode_rewards.len(), 3);
        assert!(result.total_ticks <= 150);
        assert!(result.q_table_states > 0);
        assert_eq!(agent.metadata().episodes_trained, 3);
    }

    #[test]
    fn test_checkpoint_written() {
        let repository = InMemoryRepository::new();
        let config = TrainingConfig {
            episodes: 2,
            max_steps: 20,
            checkpoint_every: 5,
        };

        let mut pipeline = TrainingPipeline::new(config)
            .with_checkpoint(Arc::new(repository.clone()), "q_table.msgpack");
        let mut agent = agent();
        let mut arena = Arena::new(ArenaConfig::default()).unwrap().with_seed(7);
        pipeline.run(&mut agent, &mut arena).unwrap();

        // Final save even though no checkpoint interval was reached.
        assert!(repository.contains(Path::new("q_table.msgpack")));
    }

    #[test]
    fn test_zero_max_steps_rejected() {
        let config = TrainingConfig {
            episodes: 1,
            max_steps: 0,
            checkpoint_every: 1,
        };
        let mut pipeline = TrainingPipeline::new(config);
        let mut arena = Arena::new(ArenaConfig::default()).unwrap();
        let err = pipeline.run(&mut agent(), &mut arena).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }
}
