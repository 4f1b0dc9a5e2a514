//! Shared configuration flags for CLI commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::SessionConfig;

/// Flags common to `train` and `play`; they override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// JSON session configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Q-table file to load and save
    #[arg(long, short = 'q')]
    pub q_table: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Initial exploration rate
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Learning rate (alpha)
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor (gamma)
    #[arg(long)]
    pub discount_factor: Option<f64>,
}

impl SessionArgs {
    /// Load the config file (or defaults) and apply flag overrides.
    pub fn resolve(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SessionConfig::default(),
        };

        if let Some(path) = &self.q_table {
            config.q_table = path.clone();
        }
        if let Some(seed) = self.seed {
            config.agent.seed = Some(seed);
        }
        if let Some(epsilon) = self.epsilon {
            config.agent.epsilon = epsilon;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.agent.learning_rate = learning_rate;
        }
        if let Some(discount_factor) = self.discount_factor {
            config.agent.discount_factor = discount_factor;
        }

        config.validate().context("invalid session configuration")?;
        Ok(config)
    }
}
