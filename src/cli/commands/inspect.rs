//! Inspect command - Summarize a saved Q-table

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use serde::Serialize;

use crate::{
    adapters::MsgPackRepository,
    cli::output,
    ports::QTableRepository,
    q_learning::{QTable, State},
    types::Action,
};

#[derive(Parser, Debug)]
#[command(about = "Summarize a saved Q-table")]
pub struct InspectArgs {
    /// Q-table file
    pub q_table: PathBuf,

    /// Number of highest-valued states to list
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Print the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// What `inspect` reports about a table.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub states: usize,
    pub episodes_trained: usize,
    pub ticks_trained: u64,
    pub seed: Option<u64>,
    pub epsilon: Option<f64>,
    /// How many states prefer each action greedily, in action order
    pub greedy_counts: Vec<(Action, usize)>,
    /// States with the highest best-action value
    pub top_states: Vec<(State, Action, f64)>,
}

impl InspectReport {
    pub fn build(table: &QTable, top: usize) -> Self {
        let entries = table.sorted_entries();

        let mut counts = [0usize; Action::COUNT];
        for (_, values) in &entries {
            counts[values.best_action().index()] += 1;
        }

        let mut ranked: Vec<(State, Action, f64)> = entries
            .iter()
            .map(|(state, values)| (*state, values.best_action(), values.max()))
            .collect();
        ranked.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top);

        Self {
            states: entries.len(),
            episodes_trained: 0,
            ticks_trained: 0,
            seed: None,
            epsilon: None,
            greedy_counts: Action::ALL.into_iter().zip(counts).collect(),
            top_states: ranked,
        }
    }
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let repository = MsgPackRepository::new();
    let saved = repository
        .load(&args.q_table)?
        .ok_or_else(|| anyhow!("no Q-table found at {}", args.q_table.display()))?;
    let table = saved.to_q_table(&args.q_table)?;

    let report = InspectReport {
        episodes_trained: saved.metadata.episodes_trained,
        ticks_trained: saved.metadata.ticks_trained,
        seed: saved.metadata.seed,
        epsilon: saved.metadata.epsilon,
        ..InspectReport::build(&table, args.top)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::print_section(&format!("Q-table {}", args.q_table.display()));
    output::print_stats_table(&[
        ("States", report.states.to_string()),
        ("Episodes trained", report.episodes_trained.to_string()),
        ("Ticks trained", output::format_number(report.ticks_trained)),
        (
            "Seed",
            report.seed.map_or_else(|| "-".to_string(), |s| s.to_string()),
        ),
        (
            "Epsilon",
            report
                .epsilon
                .map_or_else(|| "-".to_string(), |e| format!("{e:.4}")),
        ),
    ]);

    output::print_subsection("Greedy action counts");
    for (action, count) in &report.greedy_counts {
        output::print_kv(action.name(), &count.to_string());
    }

    output::print_subsection(&format!("Top {} states", report.top_states.len()));
    for (state, action, value) in &report.top_states {
        println!(
            "  {:<20} {:<6} {value:>10.3}",
            state.to_string(),
            action.name()
        );
    }

    Ok(())
}
