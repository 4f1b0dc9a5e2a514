//! Observer adapters for the tick loops
//!
//! Observers allow composable data collection during training without coupling
//! the loops to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::{
    Result,
    ports::{Casualty, EpisodeEnd, EpisodeSummary, Explosion, Observer, TickReport},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    best_score: u32,
    deaths: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            best_score: 0,
            deaths: 0,
        }
    }

    fn message(&self, last_reward: f64) -> String {
        format!(
            "reward {last_reward:.1} best {} deaths {}",
            self.best_score, self.deaths
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.best_score = self.best_score.max(summary.score);
        if summary.end == EpisodeEnd::Died {
            self.deaths += 1;
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.message(summary.total_reward));
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("best {} deaths {}", self.best_score, self.deaths));
        }
        Ok(())
    }
}

/// Metrics observer - Tracks per-episode totals
#[derive(Debug, Default)]
pub struct MetricsObserver {
    episodes: Vec<EpisodeSummary>,
    explosions: usize,
    ticks: u64,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn episodes(&self) -> &[EpisodeSummary] {
        &self.episodes
    }

    /// Mean total reward per episode
    pub fn mean_reward(&self) -> f64 {
        if self.episodes.is_empty() {
            0.0
        } else {
            self.episodes.iter().map(|e| e.total_reward).sum::<f64>() / self.episodes.len() as f64
        }
    }

    /// Mean total reward over the last `window` episodes
    pub fn recent_mean_reward(&self, window: usize) -> f64 {
        let start = self.episodes.len().saturating_sub(window);
        let recent = &self.episodes[start..];
        if recent.is_empty() {
            0.0
        } else {
            recent.iter().map(|e| e.total_reward).sum::<f64>() / recent.len() as f64
        }
    }

    /// Fraction of episodes that ended in death
    pub fn death_rate(&self) -> f64 {
        if self.episodes.is_empty() {
            0.0
        } else {
            let deaths = self
                .episodes
                .iter()
                .filter(|e| e.end == EpisodeEnd::Died)
                .count();
            deaths as f64 / self.episodes.len() as f64
        }
    }

    /// Get average episode length in ticks
    pub fn avg_episode_length(&self) -> f64 {
        if self.episodes.is_empty() {
            0.0
        } else {
            self.episodes.iter().map(|e| e.steps).sum::<usize>() as f64
                / self.episodes.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes.len(),
            ticks: self.ticks,
            explosions: self.explosions,
            best_score: self.episodes.iter().map(|e| e.score).max().unwrap_or(0),
            mean_reward: self.mean_reward(),
            death_rate: self.death_rate(),
            avg_episode_length: self.avg_episode_length(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub ticks: u64,
    pub explosions: usize,
    pub best_score: u32,
    pub mean_reward: f64,
    pub death_rate: f64,
    pub avg_episode_length: f64,
}

impl Observer for MetricsObserver {
    fn on_tick(&mut self, _report: &TickReport) -> Result<()> {
        self.ticks += 1;
        Ok(())
    }

    fn on_explosion(&mut self, _explosion: &Explosion) -> Result<()> {
        self.explosions += 1;
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episodes.push(summary.clone());
        Ok(())
    }
}

/// JSONL observer - Writes one episode summary per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, summary)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Logging observer - Reports game events through `tracing`
#[derive(Debug, Default)]
pub struct LoggingObserver {
    /// Where the run persists its table, if anywhere
    saved_to: Option<PathBuf>,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mention `path` in the completion line; only for runs that save there.
    pub fn saving_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.saved_to = Some(path.into());
        self
    }

    fn completion_message(&self) -> String {
        match &self.saved_to {
            Some(path) => format!("Training completed and Q-table saved to {}", path.display()),
            None => "Training completed".to_string(),
        }
    }
}

impl Observer for LoggingObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        info!(total_episodes, "training started");
        Ok(())
    }

    fn on_tick(&mut self, report: &TickReport) -> Result<()> {
        trace!(
            episode = report.episode,
            step = report.step,
            state = %report.state,
            action = %report.action,
            reward = report.reward,
            epsilon = report.epsilon,
            "tick"
        );
        Ok(())
    }

    fn on_explosion(&mut self, explosion: &Explosion) -> Result<()> {
        match explosion.casualty {
            Casualty::Player => info!(left = explosion.at.left, top = explosion.at.top, "player down"),
            Casualty::Enemy => trace!(left = explosion.at.left, top = explosion.at.top, "enemy down"),
        }
        Ok(())
    }

    fn on_game_over(&mut self, score: u32) -> Result<()> {
        info!(score, "game over");
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        match summary.total_episodes {
            Some(total) => info!(
                "Episode {}/{} ended with total reward: {}, score: {}",
                summary.episode + 1,
                total,
                summary.total_reward,
                summary.score
            ),
            None => info!(
                "Game {} ended with total reward: {}, score: {}",
                summary.episode + 1,
                summary.total_reward,
                summary.score
            ),
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        info!("{}", self.completion_message());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::EpisodeEnd;

    fn summary(episode: usize, reward: f64, end: EpisodeEnd) -> EpisodeSummary {
        EpisodeSummary {
            episode,
            total_episodes: Some(4),
            steps: 10 * (episode + 1),
            total_reward: reward,
            score: episode as u32 * 10,
            kills: episode,
            epsilon: 0.05,
            q_table_states: 12,
            end,
        }
    }

    #[test]
    fn test_metrics_observer_aggregates() {
        let mut metrics = MetricsObserver::new();
        metrics.on_episode_end(&summary(0, 10.0, EpisodeEnd::Died)).unwrap();
        metrics.on_episode_end(&summary(1, 20.0, EpisodeEnd::MaxSteps)).unwrap();
        metrics.on_episode_end(&summary(2, 60.0, EpisodeEnd::MaxSteps)).unwrap();

        assert_eq!(metrics.mean_reward(), 30.0);
        assert_eq!(metrics.recent_mean_reward(2), 40.0);
        assert!((metrics.death_rate() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics.avg_episode_length(), 20.0);
        assert_eq!(metrics.summary().best_score, 20);
    }

    #[test]
    fn test_jsonl_observer_writes_one_line_per_episode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.jsonl");

        {
            let mut observer = JsonlObserver::new(&path).unwrap();
            observer.on_episode_end(&summary(0, 1.5, EpisodeEnd::Died)).unwrap();
            observer.on_episode_end(&summary(1, -3.0, EpisodeEnd::MaxSteps)).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: EpisodeSummary = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.end, EpisodeEnd::Died);
        assert_eq!(first.total_reward, 1.5);
    }

    #[test]
    fn test_completion_line_mentions_save_only_when_saving() {
        assert_eq!(LoggingObserver::new().completion_message(), "Training completed");
        assert_eq!(
            LoggingObserver::new()
                .saving_to("run/q_table.msgpack")
                .completion_message(),
            "Training completed and Q-table saved to run/q_table.msgpack"
        );
    }
}
