//! Live session loop
//!
//! Runs the trained agent indefinitely. A death moves the session to
//! `GameOver`, where it waits for a restart or a quit signal from the
//! [`ControlSource`]; quitting saves the table.

use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    reward::RewardRules,
    scheduler::{TickScheduler, Unpaced},
    session::{Session, SessionPhase},
    tick::{observe_player, run_tick},
};
use crate::{
    Result,
    ports::{
        ControlEvent, ControlSource, EpisodeEnd, EpisodeSummary, Observer, QTableRepository,
        TickReport, World,
    },
    q_learning::{QLearningAgent, State, StateBuilder},
};

/// Totals of a finished live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveResult {
    /// One summary per game played
    pub games: Vec<EpisodeSummary>,
    pub ticks: u64,
    pub best_score: u32,
    pub q_table_states: usize,
}

/// Running totals of the game in progress.
#[derive(Debug, Default)]
struct GameTally {
    steps: usize,
    total_reward: f64,
    kills: usize,
}

/// Interactive session loop driven by a [`ControlSource`]
pub struct LiveLoop {
    rules: RewardRules,
    state_builder: StateBuilder,
    controls: Box<dyn ControlSource>,
    scheduler: Box<dyn TickScheduler>,
    observers: Vec<Box<dyn Observer>>,
    save_target: Option<(Arc<dyn QTableRepository + Send + Sync>, PathBuf)>,
}

impl LiveLoop {
    /// Create a live loop with the live reward preset and no pacing.
    pub fn new(controls: Box<dyn ControlSource>) -> Self {
        Self {
            rules: RewardRules::live(),
            state_builder: StateBuilder::default(),
            controls,
            scheduler: Box::new(Unpaced),
            observers: Vec::new(),
            save_target: None,
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

    pub fn with_scheduler(mut self, scheduler: Box<dyn TickScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Save the table at `path` when the session quits.
    pub fn with_save_target(
        mut self,
        repository: Arc<dyn QTableRepository + Send + Sync>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.save_target = Some((repository, path.into()));
        self
    }

    /// Run until the control source asks to quit.
    pub fn run<W>(&mut self, agent: &mut QLearningAgent, world: &mut W) -> Result<LiveResult>
    where
        W: World + ?Sized,
    {
        self.rules.validate()?;

        let mut session = Session::new();
        let mut games = Vec::new();
        let mut tally = GameTally::default();

        world.reset();
        session.start()?;
        let mut state = self.begin_game(&session, world)?;

        loop {
            match self.controls.poll(session.phase(), session.tick()) {
                Some(ControlEvent::Quit) => {
                    info!(tick = session.tick(), "quit requested");
                    if session.is_running() {
                        let summary =
                            self.summarize(&session, &tally, agent, EpisodeEnd::Quit);
                        for observer in &mut self.observers {
                            observer.on_episode_end(&summary)?;
                        }
                        games.push(summary);
                    }
                    break;
                }
                Some(ControlEvent::Restart) if session.is_game_over() => {
                    session.request_restart()?;
                    world.reset();
                    session.resume()?;
                    tally = GameTally::default();
                    state = self.begin_game(&session, world)?;
                }
                Some(ControlEvent::Restart) => {
                    debug!(phase = ?session.phase(), "restart ignored outside game over");
                }
                None => {}
            }

            match session.phase() {
                SessionPhase::Running => {
                    if let Some(next_state) =
                        self.play_tick(agent, world, &mut session, &mut tally, &state)?
                    {
                        state = next_state;
                    } else {
                        let summary =
                            self.summarize(&session, &tally, agent, EpisodeEnd::Died);
                        for observer in &mut self.observers {
                            observer.on_game_over(session.score())?;
                            observer.on_episode_end(&summary)?;
                        }
                        debug!(
                            game = summary.episode,
                            total_reward = summary.total_reward,
                            "game over"
                        );
                        games.push(summary);
                    }
                }
                _ => session.advance_tick(),
            }

            self.scheduler.wait_next();
        }

        if let Some((repository, path)) = &self.save_target {
            agent.save(repository.as_ref(), path)?;
        }

        Ok(LiveResult {
            ticks: session.tick(),
            best_score: session.best_score(),
            q_table_states: agent.q_table_size(),
            games,
        })
    }

    fn begin_game<W>(&mut self, session: &Session, world: &W) -> Result<State>
    where
        W: World + ?Sized,
    {
        for observer in &mut self.observers {
            observer.on_episode_start(session.episode())?;
        }
        observe_player(&self.state_builder, world)
    }

    /// Play one tick; `None` when it ended the game.
    fn play_tick<W>(
        &mut self,
        agent: &mut QLearningAgent,
        world: &mut W,
        session: &mut Session,
        tally: &mut GameTally,
        state: &State,
    ) -> Result<Option<State>>
    where
        W: World + ?Sized,
    {
        let tick = run_tick(
            agent,
            world,
            &self.state_builder,
            &self.rules,
            session,
            state,
        )?;
        let step = tally.steps;
        tally.steps += 1;
        tally.total_reward += tick.outcome.reward;
        tally.kills += tick.outcome.kills;

        let report = TickReport {
            episode: session.episode(),
            step,
            state: *state,
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
            session.end_game()?;
            return Ok(None);
        }
        world.advance();
        Ok(Some(tick.next_state))
    }

    fn summarize(
        &self,
        session: &Session,
        tally: &GameTally,
        agent: &QLearningAgent,
        end: EpisodeEnd,
    ) -> EpisodeSummary {
        EpisodeSummary {
            episode: session.episode(),
            total_episodes: None,
            steps: tally.steps,
            total_reward: tally.total_reward,
            score: session.score(),
            kills: tally.kills,
            epsilon: agent.epsilon(),
            q_table_states: agent.q_table_size(),
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{
        adapters::{HeadlessControls, InMemoryRepository, ScriptedControls},
        arena::{Arena, ArenaConfig},
    };

    fn agent() -> QLearningAgent {
        QLearningAgent::new(0.1, 0.9, 0.1, 0.995, 0.01).with_seed(3)
    }

    #[test]
    fn test_quit_saves_table() {
        let repository = InMemoryRepository::new();
        let mut live = LiveLoop::new(Box::new(HeadlessControls::new(Some(25), 0)))
            .with_save_target(Arc::new(repository.clone()), "live.msgpack");
        let mut arena = Arena::new(ArenaConfig::default()).unwrap().with_seed(1);

        let result = live.run(&mut agent(), &mut arena).unwrap();

        assert_eq!(result.ticks, 25);
        assert!(repository.contains(Path::new("live.msgpack")));
        assert_eq!(result.games.last().map(|g| g.end), Some(EpisodeEnd::Quit));
    }

    #[test]
    fn test_restart_ignored_while_running() {
        let controls = ScriptedControls::new([
            (2, ControlEvent::Restart),
            (10, ControlEvent::Quit),
        ]);
        let mut live = LiveLoop::new(Box::new(controls));
        let mut arena = Arena::new(ArenaConfig::default()).unwrap().with_seed(1);

        let result = live.run(&mut agent(), &mut arena).unwrap();

        assert_eq!(result.games.len(), 1);
        assert_eq!(result.games[0].steps, 10);
    }
}
