//! Train command - Run training episodes and persist the Q-table

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    app::App,
    arena::Arena,
    cli::{config::SessionArgs, output},
    pipeline::{
        JsonlObserver, LoggingObserver, ProgressObserver, TrainingPipeline, TrainingResult,
    },
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingResult,
    metadata: SummaryMetadata,
}

#[derive(Debug, Serialize)]
struct SummaryMetadata {
    q_table: PathBuf,
    seed: Option<u64>,
    episodes_trained_total: usize,
    max_steps: usize,
    learning_rate: f64,
    discount_factor: f64,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train the agent in the headless arena")]
pub struct TrainArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Tick budget per episode
    #[arg(long, short = 's')]
    pub max_steps: Option<usize>,

    /// Save the table after every N episodes
    #[arg(long)]
    pub checkpoint_every: Option<usize>,

    /// Optional file for JSONL per-episode observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    execute_with(args, &App::new())
}

/// Run training against the repository owned by `app`.
pub fn execute_with(args: TrainArgs, app: &App) -> Result<()> {
    let mut config = args.session.resolve()?;
    if let Some(episodes) = args.episodes {
        config.training.episodes = episodes;
    }
    if let Some(max_steps) = args.max_steps {
        config.training.max_steps = max_steps;
    }
    if let Some(checkpoint_every) = args.checkpoint_every {
        config.training.checkpoint_every = checkpoint_every;
    }
    config
        .training
        .validate()
        .context("invalid training configuration")?;

    let mut agent = app
        .create_agent(&config.agent, &config.q_table)
        .with_context(|| format!("failed to load Q-table {}", config.q_table.display()))?;

    let mut arena = Arena::new(config.arena.clone()).context("invalid arena configuration")?;
    if let Some(seed) = config.agent.seed {
        arena = arena.with_seed(seed.wrapping_add(1));
    }

    let mut pipeline = TrainingPipeline::new(config.training.clone())
        .with_rules(config.rewards.training.clone())
        .with_state_builder(config.agent.state_builder()?)
        .with_checkpoint(app.repository(), config.q_table.clone())
        .with_observer(Box::new(
            LoggingObserver::new().saving_to(config.q_table.clone()),
        ));
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    output::print_section("Training");
    output::print_kv("Episodes", &config.training.episodes.to_string());
    output::print_kv("Max steps", &config.training.max_steps.to_string());
    output::print_kv("Q-table", &config.q_table.display().to_string());

    let result = pipeline.run(&mut agent, &mut arena)?;

    output::print_subsection("Results");
    output::print_stats_table(&[
        ("Episodes", result.episodes.to_string()),
        ("Ticks", output::format_number(result.total_ticks)),
        ("Deaths", result.deaths.to_string()),
        ("Kills", result.total_kills.to_string()),
        ("Best score", result.best_score.to_string()),
        ("Mean reward", format!("{:.2}", result.mean_reward)),
        ("Final epsilon", format!("{:.4}", result.final_epsilon)),
        ("States", result.q_table_states.to_string()),
    ]);
    println!("\n✓ Q-table saved to: {}", config.q_table.display());

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let summary = TrainingSummaryFile {
            training: &result,
            metadata: SummaryMetadata {
                q_table: config.q_table.clone(),
                seed: config.agent.seed,
                episodes_trained_total: agent.metadata().episodes_trained,
                max_steps: config.training.max_steps,
                learning_rate: config.agent.learning_rate,
                discount_factor: config.agent.discount_factor,
            },
        };
        let file = std::fs::File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("✓ Summary written to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_summary_path() {
        assert_eq!(
            sanitize_summary_path(Path::new("out/summary")),
            PathBuf::from("out/summary.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("summary.JSON")),
            PathBuf::from("summary.JSON")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/")),
            PathBuf::from("out/training_summary.json")
        );
    }
}
