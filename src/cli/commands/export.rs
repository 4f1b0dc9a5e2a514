//! Export command - Write a saved Q-table as CSV

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::{adapters::MsgPackRepository, export::QTableCsvExporter, ports::QTableRepository};

#[derive(Parser, Debug)]
#[command(about = "Export a saved Q-table as CSV")]
pub struct ExportArgs {
    /// Q-table file to read
    pub q_table: PathBuf,

    /// Output file path
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

pub fn execute(args: ExportArgs) -> Result<()> {
    let repository = MsgPackRepository::new();
    let saved = repository
        .load(&args.q_table)?
        .ok_or_else(|| anyhow!("no Q-table found at {}", args.q_table.display()))?;
    let table = saved.to_q_table(&args.q_table)?;

    let rows = QTableCsvExporter::export(&table, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("✓ {rows} states exported to: {}", args.output.display());
    Ok(())
}
