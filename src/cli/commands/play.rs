//! Play command - Watch the trained agent in a live session

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::{HeadlessControls, InterruptibleControls, interrupt_flag},
    app::App,
    arena::Arena,
    cli::{config::SessionArgs, output},
    pipeline::{
        DEFAULT_TICK_RATE, FixedRateScheduler, JsonlObserver, LiveLoop, LoggingObserver,
        TickScheduler, Unpaced,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Run a live session with the trained agent")]
pub struct PlayArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Quit after this many ticks (runs until Ctrl-C otherwise; the table is
    /// saved either way)
    #[arg(long, short = 't')]
    pub ticks: Option<u64>,

    /// Games to restart after a game over before quitting
    #[arg(long, short = 'r', default_value_t = 0)]
    pub restarts: u32,

    /// Target ticks per second; 0 runs unpaced
    #[arg(long, default_value_t = DEFAULT_TICK_RATE)]
    pub tick_rate: u32,

    /// Optional file for JSONL per-game observations
    #[arg(long)]
    pub observations: Option<PathBuf>,
}

pub fn execute(args: PlayArgs) -> Result<()> {
    execute_with(args, &App::new())
}

/// Run a live session against the repository owned by `app`.
pub fn execute_with(args: PlayArgs, app: &App) -> Result<()> {
    let config = args.session.resolve()?;

    let mut agent = app
        .create_agent(&config.agent, &config.q_table)
        .with_context(|| format!("failed to load Q-table {}", config.q_table.display()))?;

    let mut arena = Arena::new(config.arena.clone()).context("invalid arena configuration")?;
    if let Some(seed) = config.agent.seed {
        arena = arena.with_seed(seed.wrapping_add(1));
    }

    let scheduler: Box<dyn TickScheduler> = if args.tick_rate == 0 {
        Box::new(Unpaced)
    } else {
        Box::new(FixedRateScheduler::new(args.tick_rate)?)
    };

    let controls = InterruptibleControls::new(
        HeadlessControls::new(args.ticks, args.restarts),
        interrupt_flag().context("failed to install the Ctrl-C handler")?,
    );
    let mut live = LiveLoop::new(Box::new(controls))
        .with_rules(config.rewards.live.clone())
        .with_state_builder(config.agent.state_builder()?)
        .with_scheduler(scheduler)
        .with_save_target(app.repository(), config.q_table.clone())
        .with_observer(Box::new(LoggingObserver::new()));
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        live = live.with_observer(Box::new(observer));
    }

    output::print_section("Live session");
    let result = live.run(&mut agent, &mut arena)?;

    output::print_subsection("Games");
    for game in &result.games {
        println!(
            "  #{:<4} score {:>5}  reward {:>10.1}  ticks {:>6}  ({:?})",
            game.episode + 1,
            game.score,
            game.total_reward,
            game.steps,
            game.end
        );
    }
    output::print_subsection("Session");
    output::print_stats_table(&[
        ("Ticks", output::format_number(result.ticks)),
        ("Best score", result.best_score.to_string()),
        ("States", result.q_table_states.to_string()),
    ]);
    println!("\n✓ Q-table saved to: {}", config.q_table.display());

    Ok(())
}
